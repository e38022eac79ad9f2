//! Error types for the store layer and the HTTP layer.
//!
//! Store failures of every kind surface to clients as 503: the handler only
//! needs to know that the backend could not answer, not why.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::handlers::json_response;

/// Errors raised by a `TodoStore` implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or a pooled connection was unavailable.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend was reached but rejected or failed the command.
    #[error("query error: {0}")]
    Query(String),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Request-level failures, each mapped to one status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("todo {0} not found")]
    NotFound(i64),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "MALFORMED_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BackendUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self::BackendUnavailable(error.to_string())
    }
}

/// JSON body sent with every error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::warn!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        match serde_json::to_string(&body) {
            Ok(json) => json_response(status, json),
            Err(_) => status.into_response(),
        }
    }
}
