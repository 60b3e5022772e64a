//! HTTP API handlers and routing.

pub mod error;
mod events;
mod health;
mod index;
pub mod request_context;

pub use events::HAL_JSON;
pub use request_context::REQUEST_ID;

use axum::{
    http::{header, HeaderName, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use request_context::MakeRequestUlid;

use crate::state::AppState;

/// Create the main API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID);
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, request_id.clone()])
        .expose_headers([header::LOCATION, request_id.clone()])
        .allow_origin(Any);

    Router::new()
        // Health endpoints (no auth required)
        .merge(health::routes())
        .merge(index::routes())
        .merge(events::routes())
        // Outermost last: ids are assigned before tracing and echoed on every response.
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUlid))
        .layer(cors)
        .with_state(state)
}
