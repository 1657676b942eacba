//! The per-transaction outcome record.

use alloy_primitives::U256;
use chainclassify_core::DecodedValue;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::{ClassifyError, ItemFailure};

/// Outcome of classifying one transaction.
///
/// Every field is always present when serialized; fields a mode does not
/// produce are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub tx_hash: String,
    pub mode: String,
    /// Block timestamp, Unix seconds
    pub timestamp: Option<u64>,
    pub function_name: Option<String>,
    pub params: Option<IndexMap<String, DecodedValue>>,
    pub is_genesis_transition: Option<bool>,
    pub is_mint: Option<bool>,
    /// Checksummed mint recipient
    pub recipient: Option<String>,
    #[serde(serialize_with = "serialize_opt_decimal")]
    pub token_id: Option<U256>,
    /// Number of mint transfers in the receipt
    pub mint_count: Option<usize>,
    /// Non-fatal remark, e.g. "no mint event found"
    pub note: Option<String>,
    pub success: bool,
    pub error: Option<ItemFailure>,
}

impl ClassificationResult {
    /// A successful, otherwise empty result.
    pub fn new(tx_hash: impl Into<String>, mode: impl Into<String>, timestamp: Option<u64>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            mode: mode.into(),
            timestamp,
            function_name: None,
            params: None,
            is_genesis_transition: None,
            is_mint: None,
            recipient: None,
            token_id: None,
            mint_count: None,
            note: None,
            success: true,
            error: None,
        }
    }

    pub fn failed(
        tx_hash: impl Into<String>,
        mode: impl Into<String>,
        timestamp: Option<u64>,
        err: &ClassifyError,
    ) -> Self {
        Self {
            success: false,
            error: Some(err.into()),
            ..Self::new(tx_hash, mode, timestamp)
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.is_genesis_transition == Some(true)
    }

    pub fn is_mint(&self) -> bool {
        self.is_mint == Some(true)
    }
}

fn serialize_opt_decimal<S: Serializer>(v: &Option<U256>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(v) => s.serialize_str(&v.to_string()),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainclassify_core::ErrorKind;

    #[test]
    fn serialized_record_has_every_key() {
        let r = ClassificationResult::new("0xabc", "privado", None);
        let v = serde_json::to_value(&r).unwrap();
        let obj = v.as_object().unwrap();
        for key in [
            "tx_hash",
            "mode",
            "timestamp",
            "function_name",
            "params",
            "is_genesis_transition",
            "is_mint",
            "recipient",
            "token_id",
            "mint_count",
            "note",
            "success",
            "error",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(v["success"], true);
        assert!(v["error"].is_null());
    }

    #[test]
    fn failed_result_carries_kind() {
        let err = ClassifyError::PendingTransaction { hash: "0xabc".into() };
        let r = ClassificationResult::failed("0xabc", "civic", None, &err);
        assert!(!r.success);
        assert_eq!(r.error.as_ref().unwrap().kind, ErrorKind::PendingTransaction);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["error"]["kind"], "PendingTransaction");
    }

    #[test]
    fn token_id_is_decimal_string() {
        let mut r = ClassificationResult::new("0xabc", "civic", Some(1));
        r.token_id = Some(U256::from(123_456_789u64));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["token_id"], "123456789");
    }
}
