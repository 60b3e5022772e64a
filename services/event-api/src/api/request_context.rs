//! Request-scoped context extracted from HTTP requests.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request};
use evreg_id::RequestId;
use tower_http::request_id::{self, MakeRequestId};
use tracing::debug;

use crate::api::error::ApiError;
use crate::identity::Principal;
use crate::state::AppState;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const REQUEST_ID: &str = "x-request-id";

/// Stamps requests that arrive without an `x-request-id` with a fresh `req_` id.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUlid;

impl MakeRequestId for MakeRequestUlid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<request_id::RequestId> {
        HeaderValue::from_str(&RequestId::new().to_string())
            .ok()
            .map(request_id::RequestId::new)
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub principal: Principal,
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Returns the bearer token, `None` if there is no `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_value) = header_string(headers, AUTHORIZATION_HEADER) else {
        return Ok(None);
    };

    let auth_value = auth_value.trim();
    let Some(token) = auth_value.strip_prefix("Bearer ") else {
        return Err(ApiError::unauthorized(
            "invalid_authorization",
            "Authorization must be a Bearer token",
        ));
    };

    Ok(Some(token.trim().to_string()))
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let request_id = header_string(&parts.headers, REQUEST_ID)
            .unwrap_or_else(|| RequestId::new().to_string());

        let reject = |err: ApiError| {
            err.with_request_id(request_id.clone())
                .with_index(state.assembler().links().index())
        };

        let principal = match bearer_token(&parts.headers).map_err(reject)? {
            None => Principal::Anonymous,
            Some(token) => state.identity().resolve(&token).await.map_err(|e| {
                debug!(request_id = %request_id, error = %e, "Bearer token rejected");
                reject(ApiError::unauthorized("invalid_token", e.to_string()))
            })?,
        };

        Ok(Self {
            request_id,
            principal,
        })
    }
}
