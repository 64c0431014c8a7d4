//! Remote API access.
//!
//! [`Transport`] is the seam between the store and the network: the
//! production implementation is [`HttpClient`], tests substitute an in-memory
//! one. Responses come back as a raw [`Body`] and are turned into typed values
//! by [`decode`], which is also where the API's `{"error": ...}` envelope is
//! recognised.

pub mod http;

pub use http::HttpClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Everything an action can fail with.
///
/// Values are cloneable so that the same error can be recorded in the store
/// and handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status code.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The server answered successfully but the body carried an `error` field.
    #[error("{0}")]
    Application(String),

    /// The body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// A spawned retrieval did not run to completion.
    #[error("retrieval task failed: {0}")]
    Task(String),
}

impl ApiError {
    pub fn is_application(&self) -> bool {
        matches!(self, ApiError::Application(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// A response body before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Text(String),
}

impl Body {
    /// Classifies raw response text: empty, JSON, or anything else.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            return Body::Empty;
        }
        match serde_json::from_str(&text) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(text),
        }
    }

    /// Classifies a reply by its `Content-Type`. Only JSON media types are
    /// parsed; a JSON-labelled body that does not parse stays text. Without
    /// a content type the text itself decides.
    pub fn from_reply(text: String, content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return Self::from_text(text);
        };
        if text.trim().is_empty() {
            return Body::Empty;
        }
        if !is_json_media_type(content_type) {
            return Body::Text(text);
        }
        match serde_json::from_str(&text) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(text),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Body::Empty => Value::Null,
            Body::Json(value) => value,
            Body::Text(text) => Value::String(text),
        }
    }
}

fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Issues requests against the API. Paths are relative to the base URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Body, ApiError>;

    async fn post(&self, path: &str, body: Value) -> Result<Body, ApiError>;

    async fn put(&self, path: &str) -> Result<Body, ApiError>;
}

/// Rejects bodies that carry an application-level `error` field.
pub fn check(body: Body) -> Result<Body, ApiError> {
    if let Body::Json(value) = &body {
        if let Some(message) = envelope_error(value) {
            return Err(ApiError::Application(message));
        }
    }
    Ok(body)
}

/// Applies [`check`] and deserializes the remaining payload.
pub fn decode<T: DeserializeOwned>(body: Body) -> Result<T, ApiError> {
    let value = check(body)?.into_value();
    Ok(serde_json::from_value(value)?)
}

/// A present, non-empty `error` member marks a failed call.
fn envelope_error(value: &Value) -> Option<String> {
    match value.as_object()?.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
