//! Response definitions
//!
//! Maps inventory errors onto HTTP statuses with plain-text bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::SupplyError;

/// An error ready to be sent to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Routes that answer an unknown id with 400 instead of 404
    ///
    /// Only `NotFound` is rewritten; every other error keeps its mapping.
    pub fn missing_as_bad_request(err: SupplyError, message: impl FnOnce() -> String) -> Self {
        match err {
            SupplyError::NotFound { .. } => Self::new(StatusCode::BAD_REQUEST, message()),
            other => Self::from(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<SupplyError> for ApiError {
    fn from(err: SupplyError) -> Self {
        let status = match &err {
            SupplyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SupplyError::NotFound { .. }
            | SupplyError::DependencyNotFound { .. }
            | SupplyError::NoProducts(_) => StatusCode::NOT_FOUND,
            _ => {
                tracing::error!(error = %err, "request failed in storage");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
