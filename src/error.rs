// src/error.rs

use thiserror::Error;

/// Errors surfaced by the registry, valuation and event-handling layers.
///
/// Per-item failures are isolated by callers: a failed event is dropped and
/// logged, a failed snapshot skips that pool until the next cycle.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// A generic type string did not contain the expected segments.
    #[error("malformed type argument: {0}")]
    MalformedTypeArgument(String),

    #[error("failed to fetch object {object_id}: {source}")]
    ObjectFetchFailed {
        object_id: String,
        #[source]
        source: ClientError,
    },

    #[error("malformed event payload: {0}")]
    MalformedEvent(String),

    #[error("event from foreign package {0}")]
    ForeignPackage(String),

    #[error("unknown event kind: {0}")]
    UnknownEvent(String),
}

/// Errors returned by the collaborators (RPC node, price oracle).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("rate limited")]
    RateLimited,
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::InvalidResponse(e.to_string())
        } else if e.status().map(|s| s.as_u16()) == Some(429) {
            ClientError::RateLimited
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}
