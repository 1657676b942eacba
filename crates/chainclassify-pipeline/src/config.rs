//! Pipeline configuration.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters shared by every classifier mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Sender address that marks a transfer as a mint
    #[serde(default)]
    pub null_address: Address,
    /// Boolean call parameter that flags a genesis state transition
    #[serde(default = "default_genesis_param")]
    pub genesis_param: String,
}

fn default_genesis_param() -> String { "isOldStateGenesis".into() }

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            null_address: Address::ZERO,
            genesis_param: default_genesis_param(),
        }
    }
}

/// Immutable run configuration, shared read-only by all workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Classification mode name, e.g. "privado" or "civic"
    pub mode: String,
    /// Size of the worker pool
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Contract address used instead of each transaction's `to`
    #[serde(default)]
    pub target_address: Option<Address>,
    /// Upper bound on the network phase of one item
    #[serde(default = "default_item_timeout_secs")]
    pub item_timeout_secs: u64,
    #[serde(default)]
    pub classifier: ClassifierParams,
}

fn default_workers() -> usize { 5 }
fn default_item_timeout_secs() -> u64 { 60 }

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("item timeout must be at least 1 second")]
    ZeroTimeout,
}

impl PipelineConfig {
    /// Config for `mode` with every other field at its default.
    pub fn for_mode(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            workers: default_workers(),
            target_address: None,
            item_timeout_secs: default_item_timeout_secs(),
            classifier: ClassifierParams::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.item_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
