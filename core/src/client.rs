//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! caller executes the actual HTTP round-trip.
//!
//! Create and update validate their `TodoFields` before a request is built,
//! so input the server would reject with a 400 never leaves the client.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DeleteConfirmation, ErrorBody, Todo, TodoFields, TodoId};

/// Characters left unescaped in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

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

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest::without_body(HttpMethod::Get, format!("{}/todos", self.base_url))
    }

    /// The client name is percent-encoded as a single path segment.
    pub fn build_list_todos_by_client(&self, client: &str) -> HttpRequest {
        let segment = utf8_percent_encode(client, PATH_SEGMENT);
        HttpRequest::without_body(
            HttpMethod::Get,
            format!("{}/todos/client/{segment}", self.base_url),
        )
    }

    pub fn build_get_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest::without_body(HttpMethod::Get, format!("{}/todos/{id}", self.base_url))
    }

    pub fn build_create_todo(&self, input: &TodoFields) -> Result<HttpRequest, ApiError> {
        let body = encode_fields(input)?;
        Ok(HttpRequest::with_json(
            HttpMethod::Post,
            format!("{}/todos", self.base_url),
            body,
        ))
    }

    /// Every mutable field in `input` replaces the stored value.
    pub fn build_update_todo(&self, id: TodoId, input: &TodoFields) -> Result<HttpRequest, ApiError> {
        let body = encode_fields(input)?;
        Ok(HttpRequest::with_json(
            HttpMethod::Put,
            format!("{}/todos/{id}", self.base_url),
            body,
        ))
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest::without_body(HttpMethod::Delete, format!("{}/todos/{id}", self.base_url))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_list_todos_by_client(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    /// Accepts either a 200 confirmation body or an empty 204.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Option<DeleteConfirmation>, ApiError> {
        if response.status == 204 {
            return Ok(None);
        }
        check_status(&response, 200)?;
        decode(&response.body).map(Some)
    }
}

fn encode_fields(input: &TodoFields) -> Result<String, ApiError> {
    let fields = input.clone().validate()?;
    serde_json::to_string(&fields).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        s if s == expected => Ok(()),
        400 => {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .map(|b| b.message)
                .unwrap_or_else(|_| response.body.clone());
            Err(ApiError::Validation(message))
        }
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::Http {
            status,
            body: response.body.clone(),
        }),
    }
}
