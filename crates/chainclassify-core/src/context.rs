//! Per-transaction input to classification.

use alloy_primitives::Address;

use crate::event::RawLog;

/// Everything the classifier may look at for one transaction.
///
/// Built by a pipeline worker from the fetched transaction, block and
/// (for modes that need it) receipt. Owned by that worker until the result
/// is handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionContext {
    pub hash: String,
    /// Raw call data, selector included
    pub input: Vec<u8>,
    /// Resolved contract address (override or the transaction's `to`)
    pub target: Address,
    /// Block timestamp, Unix seconds; `None` while pending
    pub timestamp: Option<u64>,
    /// Receipt logs, fetched only when the classification mode needs them
    pub logs: Option<Vec<RawLog>>,
}

impl TransactionContext {
    pub fn new(hash: impl Into<String>, input: Vec<u8>, target: Address) -> Self {
        Self {
            hash: hash.into(),
            input,
            target,
            timestamp: None,
            logs: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_logs(mut self, logs: Vec<RawLog>) -> Self {
        self.logs = Some(logs);
        self
    }
}
