//! Error types for interface parsing, ABI decoding and encoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while decoding call data, log data or a single ABI value.
///
/// All of these are per-item outcomes: the pipeline converts them into a failed
/// classification result rather than aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no function registered for selector 0x{selector}")]
    UnknownSelector { selector: String },

    #[error("no event registered for topic {topic}")]
    UnknownTopic { topic: String },

    #[error("invalid ABI type: {ty}")]
    InvalidAbiType { ty: String },

    #[error("input truncated: needed {needed} bytes at offset {offset}, buffer holds {available}")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("string value is not valid UTF-8")]
    InvalidUtf8,

    #[error("failed to decode parameter {index}: {source}")]
    AbiDecodeFailure {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("call data is empty")]
    EmptyInput,
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownSelector { .. } => ErrorKind::UnknownSelector,
            Self::UnknownTopic { .. } => ErrorKind::UnknownTopic,
            Self::InvalidAbiType { .. } => ErrorKind::InvalidAbiType,
            Self::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            Self::InvalidUtf8 => ErrorKind::InvalidUtf8,
            Self::AbiDecodeFailure { .. } => ErrorKind::AbiDecodeFailure,
            Self::EmptyInput => ErrorKind::EmptyInput,
        }
    }

    /// Innermost cause of an `AbiDecodeFailure` chain, or `self`.
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            Self::AbiDecodeFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Errors raised while building the interface registry.
/// These are fatal to a run: the interface description must be valid
/// before any work starts.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate interface entry: {signature}")]
    DuplicateInterfaceEntry { signature: String },

    #[error("invalid ABI type '{ty}' in entry '{entry}'")]
    InvalidAbiType { entry: String, ty: String },

    #[error("malformed interface description: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while ABI-encoding values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("length mismatch for {ty}: expected {expected} elements, got {got}")]
    LengthMismatch {
        ty: String,
        expected: usize,
        got: usize,
    },

    #[error("value does not fit in {ty}")]
    OutOfRange { ty: String },

    #[error("invalid ABI type: {ty}")]
    InvalidAbiType { ty: String },
}

/// Flat classification of every per-item and build-time failure.
///
/// This is what lands in the report: one stable name per failure category,
/// independent of the error's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownSelector,
    UnknownTopic,
    DuplicateInterfaceEntry,
    InvalidAbiType,
    TruncatedInput,
    InvalidUtf8,
    AbiDecodeFailure,
    EmptyInput,
    NotFound,
    PendingTransaction,
    MissingTimestamp,
    AddressUnavailable,
    UnsupportedMode,
    NetworkError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UnknownSelector => "UnknownSelector",
            Self::UnknownTopic => "UnknownTopic",
            Self::DuplicateInterfaceEntry => "DuplicateInterfaceEntry",
            Self::InvalidAbiType => "InvalidAbiType",
            Self::TruncatedInput => "TruncatedInput",
            Self::InvalidUtf8 => "InvalidUtf8",
            Self::AbiDecodeFailure => "AbiDecodeFailure",
            Self::EmptyInput => "EmptyInput",
            Self::NotFound => "NotFound",
            Self::PendingTransaction => "PendingTransaction",
            Self::MissingTimestamp => "MissingTimestamp",
            Self::AddressUnavailable => "AddressUnavailable",
            Self::UnsupportedMode => "UnsupportedMode",
            Self::NetworkError => "NetworkError",
        };
        f.write_str(s)
    }
}
