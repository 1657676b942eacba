//! Head-tail ABI decoding.
//!
//! A sequence of values is laid out as a head region followed by a tail:
//! - static values sit in the head, in order, 32-byte aligned
//! - each dynamic value's head slot holds a byte offset, relative to the start
//!   of the enclosing region, to its encoding in the tail
//!
//! `bytes`/`string` encode a length word followed by the padded payload.
//! `T[]` encodes a count word followed by a nested region holding K elements.
//! Tuples and `T[N]` are nested regions of their own when dynamic and are laid
//! out in place when static.
//!
//! Every read is bounds-checked; a read past the end of the buffer is a
//! `TruncatedInput`, never a panic.

use alloy_primitives::{Address, I256, U256};
use chainclassify_core::{
    error::DecodeError,
    types::{AbiType, DecodedValue, WORD},
};
use indexmap::IndexMap;

/// Decode the parameters of a call (or a log's data section) from `data`.
///
/// Failures are wrapped in `AbiDecodeFailure` carrying the index of the
/// parameter being decoded.
pub fn decode_params(types: &[AbiType], data: &[u8]) -> Result<Vec<DecodedValue>, DecodeError> {
    let mut values = Vec::with_capacity(types.len());
    let mut pos = 0usize;
    for (index, ty) in types.iter().enumerate() {
        let value = decode_in(ty, data, pos).map_err(|e| DecodeError::AbiDecodeFailure {
            index,
            source: Box::new(e),
        })?;
        values.push(value);
        pos = advance(pos, ty.head_size(), data.len())?;
    }
    Ok(values)
}

/// Decode a single value encoded as a one-element sequence.
pub fn decode_value(ty: &AbiType, data: &[u8]) -> Result<DecodedValue, DecodeError> {
    decode_in(ty, data, 0)
}

/// Decode the value whose head slot is at `pos` within `region`.
fn decode_in(ty: &AbiType, region: &[u8], pos: usize) -> Result<DecodedValue, DecodeError> {
    if ty.is_dynamic() {
        let offset = read_usize(region, pos)?;
        let tail = region
            .get(offset..)
            .ok_or_else(|| truncated(offset, 0, region.len()))?;
        decode_dynamic(ty, tail)
    } else {
        decode_static(ty, region, pos)
    }
}

/// Decode `types` as a sequence whose head starts at byte 0 of `region`.
fn decode_seq<'t, I>(types: I, region: &[u8]) -> Result<Vec<DecodedValue>, DecodeError>
where
    I: IntoIterator<Item = &'t AbiType>,
{
    let mut out = Vec::new();
    let mut pos = 0usize;
    for ty in types {
        out.push(decode_in(ty, region, pos)?);
        pos = advance(pos, ty.head_size(), region.len())?;
    }
    Ok(out)
}

fn decode_static(ty: &AbiType, region: &[u8], pos: usize) -> Result<DecodedValue, DecodeError> {
    match ty {
        AbiType::FixedArray(elem, len) => {
            let stride = elem.head_size();
            ensure_room(region, pos, stride.saturating_mul(*len))?;
            (0..*len)
                .map(|i| decode_static(elem, region, pos + i * stride))
                .collect::<Result<Vec<_>, _>>()
                .map(DecodedValue::Array)
        }
        AbiType::Tuple(fields) => {
            let mut out = IndexMap::with_capacity(fields.len());
            let mut at = pos;
            for (name, field_ty) in fields {
                out.insert(name.clone(), decode_static(field_ty, region, at)?);
                at = advance(at, field_ty.head_size(), region.len())?;
            }
            Ok(DecodedValue::Tuple(out))
        }
        _ => decode_scalar(ty, read_word(region, pos)?),
    }
}

fn decode_dynamic(ty: &AbiType, tail: &[u8]) -> Result<DecodedValue, DecodeError> {
    match ty {
        AbiType::Bytes => read_len_prefixed(tail).map(|b| DecodedValue::Bytes(b.to_vec())),
        AbiType::String => {
            let raw = read_len_prefixed(tail)?;
            std::str::from_utf8(raw)
                .map(|s| DecodedValue::String(s.to_owned()))
                .map_err(|_| DecodeError::InvalidUtf8)
        }
        AbiType::Array(elem) => {
            let count = read_usize(tail, 0)?;
            let region = &tail[WORD..];
            // Each element needs at least its head slot, so a hostile count
            // is rejected before any allocation. Zero-width elements still
            // cost a byte each so the count stays bounded by the input.
            ensure_room(region, 0, count.saturating_mul(elem.head_size().max(1)))?;
            decode_seq(std::iter::repeat(elem.as_ref()).take(count), region).map(DecodedValue::Array)
        }
        AbiType::FixedArray(elem, len) => {
            decode_seq(std::iter::repeat(elem.as_ref()).take(*len), tail).map(DecodedValue::Array)
        }
        AbiType::Tuple(fields) => {
            let values = decode_seq(fields.iter().map(|(_, t)| t), tail)?;
            Ok(DecodedValue::Tuple(
                fields.iter().map(|(n, _)| n.clone()).zip(values).collect(),
            ))
        }
        _ => decode_static(ty, tail, 0),
    }
}

fn decode_scalar(ty: &AbiType, word: &[u8; WORD]) -> Result<DecodedValue, DecodeError> {
    ty.validate()?;
    match ty {
        AbiType::Uint(bits) => {
            let n = usize::from(*bits / 8);
            let mut buf = [0u8; WORD];
            buf[WORD - n..].copy_from_slice(&word[WORD - n..]);
            Ok(DecodedValue::Uint(U256::from_be_bytes(buf)))
        }
        AbiType::Int(bits) => {
            let n = usize::from(*bits / 8);
            let fill = if word[WORD - n] & 0x80 != 0 { 0xff } else { 0x00 };
            let mut buf = [fill; WORD];
            buf[WORD - n..].copy_from_slice(&word[WORD - n..]);
            Ok(DecodedValue::Int(I256::from_raw(U256::from_be_bytes(buf))))
        }
        AbiType::Address => Ok(DecodedValue::Address(Address::from_slice(&word[12..]))),
        AbiType::Bool => Ok(DecodedValue::Bool(word.iter().any(|b| *b != 0))),
        AbiType::FixedBytes(n) => Ok(DecodedValue::FixedBytes(word[..usize::from(*n)].to_vec())),
        other => Err(DecodeError::InvalidAbiType { ty: other.to_string() }),
    }
}

/// Read a `bytes`/`string` payload: one length word, then the padded data.
fn read_len_prefixed(tail: &[u8]) -> Result<&[u8], DecodeError> {
    let len = read_usize(tail, 0)?;
    let padded = padded_len(len).ok_or_else(|| truncated(WORD, len, tail.len()))?;
    ensure_room(tail, WORD, padded)?;
    Ok(&tail[WORD..WORD + len])
}

fn read_word(buf: &[u8], offset: usize) -> Result<&[u8; WORD], DecodeError> {
    offset
        .checked_add(WORD)
        .and_then(|end| buf.get(offset..end))
        .and_then(|s| <&[u8; WORD]>::try_from(s).ok())
        .ok_or_else(|| truncated(offset, WORD, buf.len()))
}

/// Read a word holding an offset, length or count.
///
/// Values that cannot possibly address the buffer (anything past `usize`) are
/// reported as truncation, since following them would read out of bounds.
fn read_usize(buf: &[u8], offset: usize) -> Result<usize, DecodeError> {
    let word = read_word(buf, offset)?;
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(truncated(offset, usize::MAX, buf.len()));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| truncated(offset, usize::MAX, buf.len()))
}

fn ensure_room(buf: &[u8], offset: usize, needed: usize) -> Result<(), DecodeError> {
    match offset.checked_add(needed) {
        Some(end) if end <= buf.len() => Ok(()),
        _ => Err(truncated(offset, needed, buf.len())),
    }
}

fn advance(pos: usize, by: usize, available: usize) -> Result<usize, DecodeError> {
    pos.checked_add(by).ok_or_else(|| truncated(pos, by, available))
}

fn padded_len(len: usize) -> Option<usize> {
    len.checked_add(WORD - 1).map(|n| n / WORD * WORD)
}

fn truncated(offset: usize, needed: usize, available: usize) -> DecodeError {
    DecodeError::TruncatedInput {
        offset,
        needed,
        available,
    }
}
