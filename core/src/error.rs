//! Error types for the todo API client.
//!
//! # Design
//! The server answers with three distinct failure statuses (400, 404, 503)
//! and each gets its own variant so callers can tell a bad payload from a
//! missing todo from a storage outage. Anything else lands in `HttpError`
//! with the raw status code and body.

use std::fmt;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 400: the id or the JSON body was rejected.
    BadRequest(String),

    /// The server returned 404: the requested todo does not exist.
    NotFound,

    /// The server returned 503: the storage backend failed the operation.
    ServiceUnavailable,

    /// The server returned some other unexpected status.
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(body) => write!(f, "bad request: {body}"),
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::ServiceUnavailable => write!(f, "service unavailable"),
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
