//! Error types for the todo API client.
//!
//! # Design
//! Variants group into three kinds, which drive how the sync layer surfaces
//! a failure:
//! - transport: the request never produced a response;
//! - protocol: a response arrived but is not the JSON envelope we expect;
//! - application: a well-formed envelope reporting `success: false` (or a
//!   non-2xx status), optionally carrying a server message.

use thiserror::Error;

/// Errors returned by `TodoClient` parse methods and `Transport`s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The endpoint could not be reached or the connection failed mid-way.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response declared a content type other than JSON.
    #[error("unexpected content type: {}", .0.as_deref().unwrap_or("<none>"))]
    UnexpectedContentType(Option<String>),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A successful envelope without the `data` payload the operation needs.
    #[error("response is missing `data`")]
    MissingData,

    /// The server answered, but reported failure.
    #[error("request failed (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Application { status: u16, message: Option<String> },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Coarse classification of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Protocol,
    Application,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Application { .. } => ErrorKind::Application,
            ApiError::UnexpectedContentType(_)
            | ApiError::Deserialization(_)
            | ApiError::MissingData
            | ApiError::Serialization(_) => ErrorKind::Protocol,
        }
    }

    /// Text suitable for showing to a user.
    ///
    /// A server-supplied message wins; otherwise transport and protocol
    /// failures get a fixed explanation and everything else gets `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Application {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Transport(_) => {
                "Unable to reach the server. Check that the backend is running.".to_string()
            }
            ApiError::UnexpectedContentType(_) => {
                "The server did not return a JSON response.".to_string()
            }
            _ => fallback.to_string(),
        }
    }
}
