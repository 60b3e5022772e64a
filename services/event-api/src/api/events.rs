//! Event API endpoints.
//!
//! Responses are HAL documents (`application/hal+json`); failures are
//! problem documents carrying a link back to the API index.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{
        header::{CONTENT_TYPE, LOCATION},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use evreg_events::{EventInput, PageRequest, SortOrder, DEFAULT_PAGE_SIZE};
use evreg_id::EventId;
use serde::Serialize;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::state::AppState;

pub const HAL_JSON: &str = "application/hal+json";

/// Create event routes. The collection answers with or without a trailing slash.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/", get(list_events).post(create_event))
        .route("/api/events/{event_id}", put(update_event).get(get_event))
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a new event.
///
/// POST /api/events
async fn create_event(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<EventInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = body.map_err(|e| malformed_body(&state, &ctx, e))?;

    let created = state
        .events()
        .create(input, &ctx.principal)
        .await
        .map_err(|e| reject(&state, &ctx, e))?;

    info!(
        request_id = %ctx.request_id,
        event_id = %created.resource.record.id,
        "Created event"
    );

    let mut response = hal(StatusCode::CREATED, &created.resource);
    if let Ok(location) = HeaderValue::from_str(&created.location) {
        response.headers_mut().insert(LOCATION, location);
    }
    Ok(response)
}

/// Get one event.
///
/// GET /api/events/{event_id}
async fn get_event(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(event_id): Path<String>,
) -> Result<Response, ApiError> {
    let event_id = parse_event_id(&state, &ctx, &event_id)?;

    let resource = state
        .events()
        .get(event_id, &ctx.principal)
        .await
        .map_err(|e| reject(&state, &ctx, e))?;

    Ok(hal(StatusCode::OK, &resource))
}

/// Replace the client-controlled fields of an event.
///
/// PUT /api/events/{event_id}
async fn update_event(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(event_id): Path<String>,
    body: Result<Json<EventInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let event_id = parse_event_id(&state, &ctx, &event_id)?;
    let Json(input) = body.map_err(|e| malformed_body(&state, &ctx, e))?;

    let resource = state
        .events()
        .update(event_id, input, &ctx.principal)
        .await
        .map_err(|e| reject(&state, &ctx, e))?;

    info!(request_id = %ctx.request_id, event_id = %event_id, "Updated event");

    Ok(hal(StatusCode::OK, &resource))
}

/// List one page of events.
///
/// GET /api/events?page=&size=&sort=property,DIR
async fn list_events(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(|e| {
        ApiError::bad_request("invalid_query", e.body_text())
            .with_request_id(ctx.request_id.clone())
            .with_index(state.assembler().links().index())
    })?;

    let request = parse_page_request(&params).map_err(|e| {
        e.with_request_id(ctx.request_id.clone())
            .with_index(state.assembler().links().index())
    })?;

    let page = state
        .events()
        .list(&request, &ctx.principal)
        .await
        .map_err(|e| reject(&state, &ctx, e))?;

    Ok(hal(StatusCode::OK, &page))
}

// =============================================================================
// Helpers
// =============================================================================

fn hal<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(HAL_JSON));
    response
}

fn reject(state: &AppState, ctx: &RequestContext, err: crate::service::EventError) -> ApiError {
    ApiError::from(err)
        .with_request_id(ctx.request_id.clone())
        .with_index(state.assembler().links().index())
}

fn malformed_body(state: &AppState, ctx: &RequestContext, err: JsonRejection) -> ApiError {
    ApiError::bad_request("malformed_body", err.body_text())
        .with_request_id(ctx.request_id.clone())
        .with_index(state.assembler().links().index())
}

fn parse_event_id(state: &AppState, ctx: &RequestContext, raw: &str) -> Result<EventId, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::bad_request("invalid_event_id", "Invalid event ID format")
            .with_request_id(ctx.request_id.clone())
            .with_index(state.assembler().links().index())
    })
}

/// Builds a page request from `page`, `size`, and repeated `sort` parameters.
///
/// Unknown parameters are ignored.
fn parse_page_request(params: &[(String, String)]) -> Result<PageRequest, ApiError> {
    let mut page = 0;
    let mut size = DEFAULT_PAGE_SIZE;
    let mut sort = Vec::new();

    for (key, value) in params {
        match key.as_str() {
            "page" => {
                page = value.trim().parse().map_err(|_| {
                    ApiError::bad_request("invalid_page", "page must be a non-negative integer")
                })?;
            }
            "size" => {
                size = value.trim().parse().map_err(|_| {
                    ApiError::bad_request("invalid_page_size", "size must be a non-negative integer")
                })?;
            }
            "sort" => sort.push(value.parse::<SortOrder>()?),
            _ => {}
        }
    }

    Ok(PageRequest::new(page, size).with_sort(sort))
}
