//! Per-item classification errors.

use chainclassify_core::{DecodeError, ErrorKind};
use chainclassify_rpc::TransportError;
use serde::Serialize;
use thiserror::Error;

/// Everything that can go wrong for one transaction.
///
/// These never cross the worker boundary: the pipeline turns each into a
/// failed [`ClassificationResult`](crate::ClassificationResult).
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("transaction {hash} not found")]
    NotFound { hash: String },

    #[error("transaction {hash} is not yet included in a block")]
    PendingTransaction { hash: String },

    #[error("block {block} not found or has no timestamp")]
    MissingTimestamp { block: u64 },

    #[error("transaction {hash} has no target address and no override is configured")]
    AddressUnavailable { hash: String },

    #[error("unsupported classification mode '{mode}'")]
    UnsupportedMode { mode: String },

    #[error("network error: {0}")]
    Network(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ClassifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PendingTransaction { .. } => ErrorKind::PendingTransaction,
            Self::MissingTimestamp { .. } => ErrorKind::MissingTimestamp,
            Self::AddressUnavailable { .. } => ErrorKind::AddressUnavailable,
            Self::UnsupportedMode { .. } => ErrorKind::UnsupportedMode,
            Self::Network(_) => ErrorKind::NetworkError,
            Self::Decode(e) => e.kind(),
        }
    }
}

/// Serializable error attached to a failed result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ClassifyError> for ItemFailure {
    fn from(err: &ClassifyError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_network_errors() {
        let err: ClassifyError = TransportError::Timeout { ms: 5_000 }.into();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        let err: ClassifyError = TransportError::Http("HTTP 502: bad gateway".into()).into();
        assert_eq!(ItemFailure::from(&err).kind, ErrorKind::NetworkError);
    }

    #[test]
    fn decode_errors_keep_their_kind() {
        let err: ClassifyError = DecodeError::EmptyInput.into();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
        let failure = ItemFailure::from(&err);
        assert_eq!(failure.to_string(), "EmptyInput: call data is empty");
    }
}
