//! Function-call decoder.
//!
//! - First 4 bytes of call data = keccak256(function_signature)[:4] (the selector)
//! - Remaining bytes = the ABI-encoded parameter sequence

use chainclassify_core::{call::DecodedCall, error::DecodeError, hash::Selector};
use indexmap::IndexMap;

use crate::codec::decode_params;
use crate::registry::InterfaceRegistry;

/// Decode raw call data against the registry.
///
/// # Errors
/// - `EmptyInput` when the call data is empty
/// - `AbiDecodeFailure` at index 0 wrapping `TruncatedInput` when it is
///   shorter than a selector
/// - `UnknownSelector` when no registered function matches
/// - `AbiDecodeFailure` (with the parameter index) when the body does not decode
pub fn decode_call(calldata: &[u8], registry: &InterfaceRegistry) -> Result<DecodedCall, DecodeError> {
    if calldata.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    let (head, body) = calldata.split_at(calldata.len().min(4));
    let selector: Selector = head.try_into().map_err(|_| DecodeError::AbiDecodeFailure {
        index: 0,
        source: Box::new(DecodeError::TruncatedInput {
            offset: 0,
            needed: 4,
            available: calldata.len(),
        }),
    })?;

    let entry = registry.function(&selector)?;
    let values = decode_params(&entry.types(), body)?;

    let mut params = IndexMap::with_capacity(values.len());
    for (i, (param, value)) in entry.params.iter().zip(values).enumerate() {
        // Keep every value even if two parameters share a name
        let key = if params.contains_key(&param.name) {
            format!("arg{i}")
        } else {
            param.name.clone()
        };
        params.insert(key, value);
    }

    Ok(DecodedCall {
        function_name: entry.name.clone(),
        signature: entry.signature(),
        selector,
        params,
    })
}
