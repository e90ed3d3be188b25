//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.
//!
//! Every response goes through the same gate before its payload is looked
//! at: JSON content type, well-formed envelope, 2xx status and
//! `success: true`. Failure envelopes are decoded without touching `data`,
//! so a malformed payload on a failed request still yields the server's
//! message.

use percent_encoding::utf8_percent_encode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, COMPONENT};
use crate::types::{CreateTodo, Envelope, FilterState, TodoId, TodoItem, UpdateTodo};

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

    fn item_path(&self, id: &TodoId) -> String {
        format!(
            "{}/todos/{}",
            self.base_url,
            utf8_percent_encode(id.as_str(), COMPONENT)
        )
    }

    pub fn build_list_todos(&self, filter: &FilterState) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos", self.base_url),
            query: filter.query_pairs(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos", self.base_url),
            query: Vec::new(),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_update_todo(&self, id: &TodoId, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.item_path(id),
            query: Vec::new(),
            headers: json_headers(),
            body: Some(body),
        })
    }

    /// The server decides the new state, so the request carries no body.
    pub fn build_toggle_todo(&self, id: &TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Patch,
            path: format!("{}/toggle", self.item_path(id)),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_delete_todo(&self, id: &TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_path(id),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A successful envelope without `data` reads as an empty list.
    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        let data = check_envelope(&response)?;
        match data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => decode(data),
        }
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        require_item(check_envelope(&response)?)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        require_item(check_envelope(&response)?)
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        require_item(check_envelope(&response)?)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_envelope(&response)?;
        Ok(())
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Validate content type, envelope shape and outcome; return the raw `data`.
fn check_envelope(response: &HttpResponse) -> Result<Option<Value>, ApiError> {
    let content_type = response.header("content-type");
    if !content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json")) {
        return Err(ApiError::UnexpectedContentType(content_type.map(str::to_string)));
    }

    let envelope: Envelope<Value> =
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if !response.is_success() || !envelope.success {
        return Err(ApiError::Application {
            status: response.status,
            message: envelope.message,
        });
    }
    Ok(envelope.data)
}

fn require_item(data: Option<Value>) -> Result<TodoItem, ApiError> {
    match data {
        None | Some(Value::Null) => Err(ApiError::MissingData),
        Some(data) => decode(data),
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::Deserialization(e.to_string()))
}
