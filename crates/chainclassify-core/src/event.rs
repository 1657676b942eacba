//! Raw receipt logs and decoded events.

use alloy_primitives::{B256, U256};
use indexmap::IndexMap;
use serde::Serialize;

use crate::types::DecodedValue;

/// A log entry from a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLog {
    /// Emitting contract, if the node reported one
    pub address: Option<String>,
    /// topics[0] is the event topic hash; further topics are indexed params
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed parameters
    pub data: Vec<u8>,
}

impl RawLog {
    pub fn event_topic(&self) -> Option<&B256> {
        self.topics.first()
    }
}

/// Fields of a standard `Transfer(address indexed, address indexed, uint256 indexed)` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferEvent {
    /// Checksummed sender
    pub from: String,
    /// Checksummed recipient
    pub to: String,
    #[serde(serialize_with = "serialize_decimal")]
    pub token_id: U256,
}

/// A log decoded against a registered event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedLog {
    pub event_name: String,
    pub signature: String,
    /// Indexed and non-indexed fields, in declaration order
    pub fields: IndexMap<String, DecodedValue>,
}

impl DecodedLog {
    pub fn field(&self, name: &str) -> Option<&DecodedValue> {
        self.fields.get(name)
    }
}

pub(crate) fn serialize_decimal<S: serde::Serializer>(v: &U256, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&v.to_string())
}
