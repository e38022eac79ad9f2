//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Todo;

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.bodyless(HttpMethod::Get, self.collection())
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        self.bodyless(HttpMethod::Get, self.member(id))
    }

    /// Build a create request. Leave `input.id` at `0` to let the server
    /// assign one.
    pub fn build_create_todo(&self, input: &Todo) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, self.collection(), input)
    }

    /// Build a partial update. Only the `Some` fields of `patch` are sent.
    pub fn build_update_todo(&self, id: i64, patch: &Todo) -> Result<HttpRequest, ApiError> {
        let mut body = serde_json::to_value(patch)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        if let Some(fields) = body.as_object_mut() {
            fields.remove("id");
        }
        self.with_json(HttpMethod::Patch, self.member(id), &body)
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        self.bodyless(HttpMethod::Delete, self.member(id))
    }

    pub fn build_delete_all(&self) -> HttpRequest {
        self.bodyless(HttpMethod::Delete, self.collection())
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        decode(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_delete_all(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    fn collection(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn member(&self, id: i64) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    fn bodyless(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        400 => Err(ApiError::BadRequest(response.body.clone())),
        404 => Err(ApiError::NotFound),
        503 => Err(ApiError::ServiceUnavailable),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
