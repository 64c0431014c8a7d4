use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The `{"message": "..."}` wrapper every `/status/*` endpoint replies with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Counts are sent as decimal strings.
    pub fn as_count(&self) -> Option<u64> {
        self.message.trim().parse().ok()
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of a build request. The server usually answers with the generated
/// source as plain text; structured replies are kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadData {
    Text(String),
    Record(Value),
}

impl Default for DownloadData {
    fn default() -> Self {
        DownloadData::Text(String::new())
    }
}

impl DownloadData {
    pub fn is_empty(&self) -> bool {
        match self {
            DownloadData::Text(text) => text.is_empty(),
            DownloadData::Record(value) => value.is_null(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DownloadData::Text(text) => Some(text),
            DownloadData::Record(_) => None,
        }
    }
}
