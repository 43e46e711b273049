//! Error taxonomy shared across the collector.
//!
//! - `FetchError`: outbound HTTP calls (data source, downstream relay)
//! - `ToolError`:  dispatcher-level failures surfaced to RPC callers

use thiserror::Error;

/// Failure of a single outbound call.
///
/// Per-pair fetch failures never leave the orchestrator as errors;
/// they are rendered with `Display` into the run's error list.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure
    #[error("http: {0}")]
    Transport(String),

    /// Non-2xx response status
    #[error("http {0}")]
    Protocol(u16),

    /// Response envelope or entries did not parse
    #[error("json: {0}")]
    Parse(String),

    /// JSON-RPC error object returned by a remote service
    #[error("mcp error: {0}")]
    Remote(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// Failure of a dispatched tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments failed to deserialize or violate a constraint
    #[error("invalid arguments: {0}")]
    Validation(String),

    /// No capability registered under the requested name
    #[error("unknown tool: {0}")]
    UnknownCapability(String),

    /// Operation needs at least one completed run
    #[error("{0}")]
    EmptyState(String),

    /// Result could not be rendered
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Stable machine-readable kind, carried as RPC error data.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "validation_error",
            ToolError::UnknownCapability(_) => "validation_error",
            ToolError::EmptyState(_) => "empty_state",
            ToolError::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        ToolError::Internal(e.to_string())
    }
}
