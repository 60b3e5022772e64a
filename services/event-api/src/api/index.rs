//! API index: the entry point linking to every top-level resource.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::api::events::HAL_JSON;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api", get(index))
}

/// GET /api
async fn index(State(state): State<AppState>) -> Response {
    let mut response = Json(state.assembler().index()).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(HAL_JSON));
    response
}
