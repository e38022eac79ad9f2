//! HTTP handlers for the `/todos` routes.
//!
//! Each handler extracts its inputs, validates them, makes one store call and
//! turns the outcome into exactly one response. Bodies are parsed from raw
//! bytes rather than through axum's `Json` extractor so that every malformed
//! payload (bad syntax, wrong field type, missing content-type) is a 400.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use todo_core::Todo;

use crate::error::{ApiError, StoreError};
use crate::AppState;

pub const CONTENT_TYPE_JSON: &str = "application/json;charset=utf8";

pub fn json_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON))],
        body,
    )
        .into_response()
}

fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string(value).map_err(StoreError::from)?)
}

fn encode_pretty<T: Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value).map_err(StoreError::from)?)
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::MalformedInput(format!("invalid todo id '{raw}'")))
}

fn parse_body(body: &Bytes) -> Result<Todo, ApiError> {
    serde_json::from_slice(body).map_err(|error| ApiError::MalformedInput(error.to_string()))
}

/// Absolute URI of the collection a request was sent to, without a trailing slash.
///
/// Uses the request target when it is already absolute, otherwise rebuilds it
/// from the `Host` header.
pub fn request_base(headers: &HeaderMap, uri: &Uri) -> String {
    let path = uri.path().trim_end_matches('/');
    if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
        return format!("{scheme}://{authority}{path}");
    }
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}{path}")
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let todo = state.store.get_one(id).await?.ok_or(ApiError::NotFound(id))?;
    Ok(json_response(StatusCode::OK, encode(&todo)?))
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Response, ApiError> {
    let todos = state.store.get_all().await?;
    Ok(json_response(StatusCode::OK, encode_pretty(&todos)?))
}

pub async fn create_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let mut todo = parse_body(&body)?;
    if state.ids.assign(&mut todo).is_none() {
        return Err(ApiError::BackendUnavailable("no todo ids left to assign".to_string()));
    }
    todo.url = Some(todo.location(&request_base(&headers, &uri)));

    if !state.store.insert(&todo).await? {
        return Err(ApiError::BackendUnavailable(format!("todo {} was not stored", todo.id)));
    }
    tracing::debug!(id = todo.id, "todo created");
    Ok(json_response(StatusCode::CREATED, encode_pretty(&todo)?))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let patch = parse_body(&body)?;
    let merged = state.store.update(id, &patch).await?.ok_or(ApiError::NotFound(id))?;
    Ok(json_response(StatusCode::OK, encode_pretty(&merged)?))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(ApiError::BackendUnavailable(format!("todo {id} was not deleted")));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete_all(State(state): State<AppState>) -> Result<Response, ApiError> {
    if !state.store.delete_all().await? {
        return Err(ApiError::BackendUnavailable("todos were not cleared".to_string()));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com:8082"));
        let uri: Uri = "/todos".parse().unwrap();
        assert_eq!(request_base(&headers, &uri), "http://example.com:8082/todos");
    }

    #[test]
    fn base_from_absolute_uri() {
        let uri: Uri = "https://api.example.com/todos/".parse().unwrap();
        assert_eq!(request_base(&HeaderMap::new(), &uri), "https://api.example.com/todos");
    }

    #[test]
    fn base_without_host_falls_back_to_localhost() {
        let uri: Uri = "/todos".parse().unwrap();
        assert_eq!(request_base(&HeaderMap::new(), &uri), "http://localhost/todos");
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::MalformedInput(_))));
    }

    #[test]
    fn empty_body_is_malformed() {
        assert!(matches!(parse_body(&Bytes::new()), Err(ApiError::MalformedInput(_))));
    }
}
