//! # chainclassify-core
//!
//! Core types and primitives shared across all ChainClassify crates.
//! The ABI type model, decoded values, the per-transaction context and the
//! error taxonomy are defined here so the decoder, RPC and pipeline crates
//! agree on a single vocabulary.

pub mod call;
pub mod context;
pub mod error;
pub mod event;
pub mod hash;
pub mod types;

pub use call::DecodedCall;
pub use context::TransactionContext;
pub use error::{DecodeError, EncodeError, ErrorKind, RegistryError};
pub use event::{DecodedLog, RawLog, TransferEvent};
pub use hash::{keccak256, selector, to_checksum_address, topic_hash, Selector};
pub use types::{AbiType, DecodedValue};
