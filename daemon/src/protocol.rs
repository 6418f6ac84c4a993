use serde::{Deserialize, Serialize};

/// Query string of `GET /output`. A missing `string` reads as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputQuery {
    pub string: String,
}

impl OutputQuery {
    /// First `string` value among the decoded query pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let string = pairs
            .into_iter()
            .find_map(|(key, value)| (key == "string").then_some(value))
            .unwrap_or_default();
        Self { string }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub source: SourceKind,
    pub cached_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Which prediction variant is serving requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Heuristic,
    Bigram,
    Model,
}
