use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use evreg_events::{FieldViolation, PagingError};
use serde::Serialize;
use tracing::error;

use crate::assembler::{rel, Links};
use crate::service::EventError;

#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    pub code: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
    #[serde(rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl ProblemDetails {
    fn new(status: StatusCode, code: impl Into<String>, detail: impl Into<String>) -> Self {
        let code = code.into();
        let title = status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_string();
        Self {
            r#type: format!("https://evreg.dev/problems/{code}"),
            title,
            status: status.as_u16(),
            detail: detail.into(),
            instance: None,
            code,
            request_id: "unknown".to_string(),
            details: None,
            links: None,
        }
    }

    fn set_request_id(&mut self, request_id: impl Into<String>) {
        let request_id = request_id.into();
        self.request_id = request_id.clone();
        if self.instance.is_none() {
            self.instance = Some(request_id);
        }
    }

    fn set_details(&mut self, details: Vec<FieldViolation>) {
        self.details = Some(details);
    }

    fn set_index(&mut self, href: String) {
        let mut links = Links::default();
        links.push(rel::INDEX, href);
        self.links = Some(links);
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub problem: Box<ProblemDetails>,
}

impl ApiError {
    fn with_status(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        let problem = Box::new(ProblemDetails::new(status, code, message));
        Self { status, problem }
    }

    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, code, message)
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.problem.set_request_id(request_id);
        self
    }

    pub fn with_details(mut self, details: Vec<FieldViolation>) -> Self {
        self.problem.set_details(details);
        self
    }

    /// Points clients back at the API index.
    pub fn with_index(mut self, href: impl Into<String>) -> Self {
        self.problem.set_index(href.into());
        self
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        let detail = err.to_string();
        match err {
            EventError::Required(violations) => {
                ApiError::bad_request("required", detail).with_details(violations.into_iter().collect())
            }
            EventError::ValidationFailed(violations) => {
                ApiError::bad_request("validation_failed", detail)
                    .with_details(violations.into_iter().collect())
            }
            EventError::IdentityConflict => ApiError::bad_request("identity_conflict", detail),
            EventError::IllegalState(_) => ApiError::bad_request("illegal_state", detail),
            EventError::NotFound(_) => ApiError::not_found("event_not_found", detail),
            EventError::Unauthenticated => ApiError::unauthorized("unauthenticated", detail),
            EventError::Store(e) => {
                error!(error = %e, "Event store failure");
                ApiError::internal("internal_error", "Failed to access event storage")
            }
        }
    }
}

impl From<PagingError> for ApiError {
    fn from(err: PagingError) -> Self {
        ApiError::bad_request("invalid_sort", err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.problem)).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
