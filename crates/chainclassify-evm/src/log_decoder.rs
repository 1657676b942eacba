//! Receipt-log decoding.
//!
//! # Indexed-parameter encoding rules
//! - **Value types** (uint, int, bool, address, bytesN) are stored in a topic
//!   as a single padded word and can be decoded directly.
//! - **Reference types** (string, bytes, arrays, tuples) are stored as the
//!   keccak256 of their encoding; the original value is unrecoverable, so the
//!   raw 32-byte hash is returned as `FixedBytes`.

use alloy_primitives::{Address, B256, U256};
use chainclassify_core::{
    error::DecodeError,
    event::{DecodedLog, RawLog, TransferEvent},
    hash::{to_checksum_address, topic_hash},
    types::{AbiType, DecodedValue},
};
use indexmap::IndexMap;

use crate::codec::{decode_params, decode_value};
use crate::registry::InterfaceRegistry;

/// Canonical signature of the standard token-transfer event.
pub const TRANSFER_SIGNATURE: &str = "Transfer(address,address,uint256)";

/// Topic hash of [`TRANSFER_SIGNATURE`].
pub fn transfer_topic() -> B256 {
    topic_hash(TRANSFER_SIGNATURE)
}

/// Extract `{from, to, tokenId}` from a `Transfer` log with all three
/// parameters indexed (ERC-721 shape).
///
/// Returns `None` for any other log, including ERC-20 transfers whose amount
/// lives in `data`. The topic hash is a pure function of the signature, so
/// logs match whether or not the loaded interface declares the event.
pub fn decode_transfer_event(log: &RawLog) -> Option<TransferEvent> {
    if log.topics.len() != 4 || log.topics[0] != transfer_topic() {
        return None;
    }
    Some(TransferEvent {
        from: topic_address(&log.topics[1]),
        to: topic_address(&log.topics[2]),
        token_id: U256::from_be_bytes(log.topics[3].0),
    })
}

fn topic_address(topic: &B256) -> String {
    to_checksum_address(&Address::from_slice(&topic.as_slice()[12..]))
}

/// Decode any log whose topic hash is registered.
///
/// # Errors
/// - `UnknownTopic` if topics[0] is missing or unregistered
/// - `AbiDecodeFailure` (with the parameter index) if an indexed topic is
///   missing or the data section does not decode
pub fn decode_log(log: &RawLog, registry: &InterfaceRegistry) -> Result<DecodedLog, DecodeError> {
    let topic0 = log.event_topic().ok_or_else(|| DecodeError::UnknownTopic {
        topic: "<none>".into(),
    })?;
    let entry = registry.event(topic0)?;

    let mut indexed = Vec::new();
    let mut data_idx = Vec::new();
    for (i, p) in entry.params.iter().enumerate() {
        if p.indexed {
            indexed.push(i);
        } else {
            data_idx.push(i);
        }
    }

    let mut values: Vec<Option<DecodedValue>> = vec![None; entry.params.len()];

    for (k, &i) in indexed.iter().enumerate() {
        let wrap = |e: DecodeError| DecodeError::AbiDecodeFailure {
            index: i,
            source: Box::new(e),
        };
        let topic = log.topics.get(k + 1).ok_or_else(|| {
            wrap(DecodeError::TruncatedInput {
                offset: k + 1,
                needed: 1,
                available: log.topics.len(),
            })
        })?;
        values[i] = Some(decode_topic(topic, &entry.params[i].ty).map_err(wrap)?);
    }

    let data_types: Vec<AbiType> = data_idx.iter().map(|&i| entry.params[i].ty.clone()).collect();
    let decoded = decode_params(&data_types, &log.data).map_err(|e| match e {
        DecodeError::AbiDecodeFailure { index, source } => DecodeError::AbiDecodeFailure {
            index: data_idx[index],
            source,
        },
        other => other,
    })?;
    for (&i, v) in data_idx.iter().zip(decoded) {
        values[i] = Some(v);
    }

    let mut fields = IndexMap::with_capacity(values.len());
    for (i, (param, value)) in entry.params.iter().zip(values).enumerate() {
        let Some(value) = value else { continue };
        let key = if fields.contains_key(&param.name) {
            format!("arg{i}")
        } else {
            param.name.clone()
        };
        fields.insert(key, value);
    }

    Ok(DecodedLog {
        event_name: entry.name.clone(),
        signature: entry.signature(),
        fields,
    })
}

fn decode_topic(topic: &B256, ty: &AbiType) -> Result<DecodedValue, DecodeError> {
    match ty {
        AbiType::Bytes
        | AbiType::String
        | AbiType::Array(_)
        | AbiType::FixedArray(..)
        | AbiType::Tuple(_) => Ok(DecodedValue::FixedBytes(topic.to_vec())),
        _ => decode_value(ty, topic.as_slice()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded_address(byte: u8) -> B256 {
        let mut w = [0u8; 32];
        w[12..].copy_from_slice(&[byte; 20]);
        B256::from(w)
    }

    fn u256_topic(v: u64) -> B256 {
        B256::from(U256::from(v).to_be_bytes::<32>())
    }

    #[test]
    fn transfer_topic_constant() {
        assert_eq!(
            hex::encode(transfer_topic().as_slice()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn decodes_nft_transfer() {
        let log = RawLog {
            address: None,
            topics: vec![transfer_topic(), B256::ZERO, padded_address(0xab), u256_topic(7)],
            data: vec![],
        };
        let ev = decode_transfer_event(&log).unwrap();
        assert_eq!(ev.from, "0x0000000000000000000000000000000000000000");
        assert_eq!(ev.to, to_checksum_address(&Address::repeat_byte(0xab)));
        assert_eq!(ev.token_id, U256::from(7u64));
    }

    #[test]
    fn erc20_shaped_transfer_is_skipped() {
        let log = RawLog {
            address: None,
            topics: vec![transfer_topic(), B256::ZERO, padded_address(0xab)],
            data: vec![0u8; 32],
        };
        assert!(decode_transfer_event(&log).is_none());
    }

    #[test]
    fn other_topic_is_skipped() {
        let log = RawLog {
            address: None,
            topics: vec![B256::repeat_byte(1), B256::ZERO, B256::ZERO, B256::ZERO],
            data: vec![],
        };
        assert!(decode_transfer_event(&log).is_none());
    }

    #[test]
    fn generic_decode_mixes_topics_and_data() {
        let abi = r#"[{"type": "event", "name": "Approval", "inputs": [
            {"name": "owner", "type": "address", "indexed": true},
            {"name": "spender", "type": "address", "indexed": true},
            {"name": "value", "type": "uint256", "indexed": false}
        ]}]"#;
        let reg = InterfaceRegistry::from_json(abi).unwrap();
        let log = RawLog {
            address: None,
            topics: vec![
                topic_hash("Approval(address,address,uint256)"),
                padded_address(0x11),
                padded_address(0x22),
            ],
            data: U256::from(500u64).to_be_bytes::<32>().to_vec(),
        };
        let decoded = decode_log(&log, &reg).unwrap();
        assert_eq!(decoded.event_name, "Approval");
        let names: Vec<_> = decoded.fields.keys().cloned().collect();
        assert_eq!(names, vec!["owner", "spender", "value"]);
        assert_eq!(
            decoded.field("value"),
            Some(&DecodedValue::Uint(U256::from(500u64)))
        );
    }

    #[test]
    fn repeated_field_names_keep_every_value() {
        let abi = r#"[{"type": "event", "name": "Pair", "inputs": [
            {"name": "x", "type": "uint256", "indexed": true},
            {"name": "x", "type": "uint256", "indexed": false}
        ]}]"#;
        let reg = InterfaceRegistry::from_json(abi).unwrap();
        let log = RawLog {
            address: None,
            topics: vec![topic_hash("Pair(uint256,uint256)"), u256_topic(7)],
            data: U256::from(9u64).to_be_bytes::<32>().to_vec(),
        };
        let decoded = decode_log(&log, &reg).unwrap();
        assert_eq!(decoded.fields.len(), 2);
        assert_eq!(decoded.field("x"), Some(&DecodedValue::Uint(U256::from(7u64))));
        assert_eq!(decoded.field("arg1"), Some(&DecodedValue::Uint(U256::from(9u64))));
    }

    #[test]
    fn unregistered_topic() {
        let reg = InterfaceRegistry::default();
        let log = RawLog {
            address: None,
            topics: vec![B256::repeat_byte(9)],
            data: vec![],
        };
        assert!(matches!(decode_log(&log, &reg), Err(DecodeError::UnknownTopic { .. })));
    }
}
