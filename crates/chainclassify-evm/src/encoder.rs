//! ABI encoder — the inverse of `codec`.
//!
//! Produces the canonical head-tail layout: offsets are relative to the start
//! of the enclosing region, payloads are right-padded to a word boundary and
//! signed integers are sign-extended to a full word.

use chainclassify_core::{
    error::EncodeError,
    types::{AbiType, DecodedValue, WORD},
};

use crate::interface::InterfaceEntry;

/// Encode a function call: `selector ++ encode_params(inputs, values)`.
pub fn encode_call(entry: &InterfaceEntry, values: &[DecodedValue]) -> Result<Vec<u8>, EncodeError> {
    let mut out = entry.selector().to_vec();
    out.extend(encode_params(&entry.types(), values)?);
    Ok(out)
}

/// Encode `values` as a top-level sequence of `types`.
pub fn encode_params(types: &[AbiType], values: &[DecodedValue]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != values.len() {
        return Err(EncodeError::LengthMismatch {
            ty: "parameter list".into(),
            expected: types.len(),
            got: values.len(),
        });
    }
    let pairs: Vec<_> = types.iter().zip(values).collect();
    encode_seq(&pairs)
}

fn encode_seq(pairs: &[(&AbiType, &DecodedValue)]) -> Result<Vec<u8>, EncodeError> {
    let head_len: usize = pairs.iter().map(|(t, _)| t.head_size()).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for (ty, value) in pairs {
        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend(encode_dynamic(ty, value)?);
        } else {
            encode_static(ty, value, &mut head)?;
        }
    }
    head.extend(tail);
    Ok(head)
}

fn encode_static(ty: &AbiType, value: &DecodedValue, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match (ty, value) {
        (AbiType::FixedArray(elem, len), DecodedValue::Array(items)) => {
            check_len(ty, *len, items.len())?;
            items.iter().try_for_each(|item| encode_static(elem, item, out))
        }
        (AbiType::Tuple(fields), DecodedValue::Tuple(map)) => {
            check_len(ty, fields.len(), map.len())?;
            for (name, field_ty) in fields {
                let v = map.get(name).ok_or_else(|| mismatch(ty, value))?;
                encode_static(field_ty, v, out)?;
            }
            Ok(())
        }
        _ => {
            out.extend_from_slice(&encode_scalar(ty, value)?);
            Ok(())
        }
    }
}

fn encode_dynamic(ty: &AbiType, value: &DecodedValue) -> Result<Vec<u8>, EncodeError> {
    match (ty, value) {
        (AbiType::Bytes, DecodedValue::Bytes(b)) => Ok(len_prefixed(b)),
        (AbiType::String, DecodedValue::String(s)) => Ok(len_prefixed(s.as_bytes())),
        (AbiType::Array(elem), DecodedValue::Array(items)) => {
            let mut out = usize_word(items.len()).to_vec();
            let pairs: Vec<_> = items.iter().map(|v| (elem.as_ref(), v)).collect();
            out.extend(encode_seq(&pairs)?);
            Ok(out)
        }
        (AbiType::FixedArray(elem, len), DecodedValue::Array(items)) => {
            check_len(ty, *len, items.len())?;
            let pairs: Vec<_> = items.iter().map(|v| (elem.as_ref(), v)).collect();
            encode_seq(&pairs)
        }
        (AbiType::Tuple(fields), DecodedValue::Tuple(map)) => {
            check_len(ty, fields.len(), map.len())?;
            let pairs = fields
                .iter()
                .map(|(name, t)| map.get(name).map(|v| (t, v)).ok_or_else(|| mismatch(ty, value)))
                .collect::<Result<Vec<_>, _>>()?;
            encode_seq(&pairs)
        }
        _ => Err(mismatch(ty, value)),
    }
}

fn encode_scalar(ty: &AbiType, value: &DecodedValue) -> Result<[u8; WORD], EncodeError> {
    ty.validate()
        .map_err(|_| EncodeError::InvalidAbiType { ty: ty.to_string() })?;
    let mut word = [0u8; WORD];
    match (ty, value) {
        (AbiType::Uint(bits), DecodedValue::Uint(u)) => {
            if u.bit_len() > usize::from(*bits) {
                return Err(EncodeError::OutOfRange { ty: ty.to_string() });
            }
            word = u.to_be_bytes::<WORD>();
        }
        (AbiType::Int(bits), DecodedValue::Int(i)) => {
            let raw = i.into_raw().to_be_bytes::<WORD>();
            let n = usize::from(*bits / 8);
            let fill = if raw[WORD - n] & 0x80 != 0 { 0xff } else { 0x00 };
            if raw[..WORD - n].iter().any(|b| *b != fill) {
                return Err(EncodeError::OutOfRange { ty: ty.to_string() });
            }
            word = raw;
        }
        (AbiType::Address, DecodedValue::Address(a)) => word[12..].copy_from_slice(a.as_slice()),
        (AbiType::Bool, DecodedValue::Bool(b)) => word[WORD - 1] = u8::from(*b),
        (AbiType::FixedBytes(n), DecodedValue::FixedBytes(b)) => {
            check_len(ty, usize::from(*n), b.len())?;
            word[..b.len()].copy_from_slice(b);
        }
        _ => return Err(mismatch(ty, value)),
    }
    Ok(word)
}

fn len_prefixed(data: &[u8]) -> Vec<u8> {
    let mut out = usize_word(data.len()).to_vec();
    out.extend_from_slice(data);
    let rem = data.len() % WORD;
    if rem != 0 {
        out.resize(out.len() + WORD - rem, 0);
    }
    out
}

fn usize_word(v: usize) -> [u8; WORD] {
    let mut w = [0u8; WORD];
    w[WORD - 8..].copy_from_slice(&(v as u64).to_be_bytes());
    w
}

fn check_len(ty: &AbiType, expected: usize, got: usize) -> Result<(), EncodeError> {
    if expected != got {
        return Err(EncodeError::LengthMismatch {
            ty: ty.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

fn mismatch(ty: &AbiType, value: &DecodedValue) -> EncodeError {
    EncodeError::TypeMismatch {
        expected: ty.to_string(),
        got: value.kind_name().to_string(),
    }
}
