//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur while talking to a node.
///
/// Every variant maps to the `NetworkError` kind once it reaches a
/// classification result.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The node answered, but a field had an unexpected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Returns `true` if this is a node-side error rather than a connectivity failure.
    pub fn is_node_error(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::InvalidResponse(_))
    }
}
