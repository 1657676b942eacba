//! The blockchain-client capability consumed by the pipeline, and its
//! JSON-RPC implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use chainclassify_core::RawLog;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::request::JsonRpcRequest;
use crate::transport::RpcTransport;

/// A transaction as far as classification cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    pub hash: String,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub input: Vec<u8>,
    /// `None` while the transaction is pending
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub number: u64,
    /// Unix seconds
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReceiptInfo {
    pub logs: Vec<RawLog>,
}

/// Read-only chain access used by pipeline workers.
///
/// `Ok(None)` means the node does not know the object; transport and
/// protocol failures are `Err`. Implementations must be safe to share
/// across concurrent workers.
#[async_trait]
pub trait BlockchainClient: Send + Sync {
    async fn get_transaction(&self, hash: &str) -> Result<Option<TransactionInfo>, TransportError>;

    async fn get_block(&self, number: u64) -> Result<Option<BlockInfo>, TransportError>;

    async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<ReceiptInfo>, TransportError>;
}

/// [`BlockchainClient`] over any [`RpcTransport`], using the standard
/// `eth_*` methods.
pub struct EvmRpcClient {
    transport: Arc<dyn RpcTransport>,
    next_id: AtomicU64,
}

impl EvmRpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let resp = self.transport.send(JsonRpcRequest::new(id, method, params)).await?;
        resp.into_result().map_err(TransportError::Rpc)
    }
}

#[async_trait]
impl BlockchainClient for EvmRpcClient {
    async fn get_transaction(&self, hash: &str) -> Result<Option<TransactionInfo>, TransportError> {
        let v = self.request("eth_getTransactionByHash", vec![json!(hash)]).await?;
        if v.is_null() {
            return Ok(None);
        }
        transaction_from_json(&v).map(Some)
    }

    async fn get_block(&self, number: u64) -> Result<Option<BlockInfo>, TransportError> {
        let v = self
            .request("eth_getBlockByNumber", vec![json!(format!("0x{number:x}")), json!(false)])
            .await?;
        if v.is_null() {
            return Ok(None);
        }
        block_from_json(&v).map(Some)
    }

    async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<ReceiptInfo>, TransportError> {
        let v = self.request("eth_getTransactionReceipt", vec![json!(hash)]).await?;
        if v.is_null() {
            return Ok(None);
        }
        receipt_from_json(&v).map(Some)
    }
}

// ─── JSON helpers ─────────────────────────────────────────────────────────────

fn invalid(field: &str, detail: impl std::fmt::Display) -> TransportError {
    TransportError::InvalidResponse(format!("{field}: {detail}"))
}

fn str_field<'a>(v: &'a Value, field: &str) -> Result<&'a str, TransportError> {
    v[field].as_str().ok_or_else(|| invalid(field, "missing or not a string"))
}

/// `Ok(None)` for a missing or null field.
fn opt_str_field<'a>(v: &'a Value, field: &str) -> Result<Option<&'a str>, TransportError> {
    match &v[field] {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.as_str())),
        other => Err(invalid(field, format!("unexpected value {other}"))),
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_hex_u64(s: &str) -> Result<u64, TransportError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| invalid(s, e))
}

/// Parse `0x`-prefixed hex data; `0x` alone is empty.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, TransportError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| invalid(s, e))
}

fn parse_address(s: &str) -> Result<Address, TransportError> {
    s.parse::<Address>().map_err(|e| invalid(s, e))
}

fn parse_b256(s: &str) -> Result<B256, TransportError> {
    s.parse::<B256>().map_err(|e| invalid(s, e))
}

/// Convert an `eth_getTransactionByHash` result.
pub fn transaction_from_json(v: &Value) -> Result<TransactionInfo, TransportError> {
    // Some nodes still answer with the legacy `data` key.
    let input = match opt_str_field(v, "input")? {
        Some(s) => s,
        None => opt_str_field(v, "data")?.unwrap_or("0x"),
    };
    Ok(TransactionInfo {
        hash: str_field(v, "hash")?.to_string(),
        to: opt_str_field(v, "to")?.map(parse_address).transpose()?,
        input: parse_hex_bytes(input)?,
        block_number: opt_str_field(v, "blockNumber")?.map(parse_hex_u64).transpose()?,
    })
}

/// Convert an `eth_getBlockByNumber` result.
pub fn block_from_json(v: &Value) -> Result<BlockInfo, TransportError> {
    Ok(BlockInfo {
        number: parse_hex_u64(str_field(v, "number")?)?,
        timestamp: parse_hex_u64(str_field(v, "timestamp")?)?,
    })
}

/// Convert an `eth_getTransactionReceipt` result, keeping log order.
pub fn receipt_from_json(v: &Value) -> Result<ReceiptInfo, TransportError> {
    let logs = match &v["logs"] {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(log_from_json).collect::<Result<_, _>>()?,
        other => return Err(invalid("logs", format!("unexpected value {other}"))),
    };
    Ok(ReceiptInfo { logs })
}

fn log_from_json(v: &Value) -> Result<RawLog, TransportError> {
    let topics = v["topics"]
        .as_array()
        .ok_or_else(|| invalid("topics", "missing or not an array"))?
        .iter()
        .map(|t| t.as_str().ok_or_else(|| invalid("topics", "non-string topic")).and_then(parse_b256))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RawLog {
        address: opt_str_field(v, "address")?.map(str::to_string),
        topics,
        data: parse_hex_bytes(opt_str_field(v, "data")?.unwrap_or("0x"))?,
    })
}
