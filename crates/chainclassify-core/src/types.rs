//! The ABI type model and decoded values.
//!
//! `AbiType` is a closed tagged variant over every Solidity type the codec
//! understands. Whether a type is static or dynamic is derived from its shape,
//! never stored. `DecodedValue` mirrors the leaves of `AbiType`.

use alloy_primitives::{Address, I256, U256};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::DecodeError;
use crate::hash::to_checksum_address;

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;

/// An ABI parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// Unsigned integer, width in bits (8..=256, multiple of 8).
    Uint(u16),
    /// Two's-complement signed integer, width in bits.
    Int(u16),
    /// 20-byte EVM address
    Address,
    Bool,
    /// `bytesN`, N in 1..=32
    FixedBytes(u8),
    /// Variable-length `bytes`
    Bytes,
    /// UTF-8 `string`
    String,
    /// `T[]`
    Array(Box<AbiType>),
    /// `T[N]`
    FixedArray(Box<AbiType>, usize),
    /// Tuple / struct with named components, in declaration order.
    Tuple(Vec<(String, AbiType)>),
}

impl AbiType {
    /// A type is dynamic iff it is `bytes`, `string`, `T[]`, or a tuple /
    /// fixed array containing a dynamic element.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(elem, _) => elem.is_dynamic(),
            AbiType::Tuple(fields) => fields.iter().any(|(_, t)| t.is_dynamic()),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in its parent's head region.
    ///
    /// Dynamic types occupy a single offset slot. Static composites are laid
    /// out in place and occupy the sum of their elements' heads.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD;
        }
        match self {
            AbiType::FixedArray(elem, len) => elem.head_size().saturating_mul(*len),
            AbiType::Tuple(fields) => fields.iter().map(|(_, t)| t.head_size()).sum(),
            _ => WORD,
        }
    }

    /// Check integer widths and fixed-bytes sizes, recursively.
    pub fn validate(&self) -> Result<(), DecodeError> {
        match self {
            AbiType::Uint(bits) | AbiType::Int(bits) => {
                if *bits == 0 || *bits > 256 || bits % 8 != 0 {
                    return Err(DecodeError::InvalidAbiType { ty: self.to_string() });
                }
                Ok(())
            }
            AbiType::FixedBytes(n) => {
                if *n == 0 || *n > 32 {
                    return Err(DecodeError::InvalidAbiType { ty: self.to_string() });
                }
                Ok(())
            }
            AbiType::Array(elem) | AbiType::FixedArray(elem, _) => elem.validate(),
            AbiType::Tuple(fields) => fields.iter().try_for_each(|(_, t)| t.validate()),
            AbiType::Address | AbiType::Bool | AbiType::Bytes | AbiType::String => Ok(()),
        }
    }
}

/// Canonical type name as used in signatures: `uint256`, `bytes32[]`,
/// `(address,uint256)[2]`.
impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Address => write!(f, "address"),
            AbiType::Bool => write!(f, "bool"),
            AbiType::FixedBytes(n) => write!(f, "bytes{n}"),
            AbiType::Bytes => write!(f, "bytes"),
            AbiType::String => write!(f, "string"),
            AbiType::Array(elem) => write!(f, "{elem}[]"),
            AbiType::FixedArray(elem, len) => write!(f, "{elem}[{len}]"),
            AbiType::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(_, t)| t.to_string()).collect();
                write!(f, "({})", parts.join(","))
            }
        }
    }
}

/// A decoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Uint(U256),
    Int(I256),
    Bool(bool),
    Address(Address),
    /// `bytesN` contents (exactly N bytes)
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// Elements of a `T[]` or `T[N]`
    Array(Vec<DecodedValue>),
    /// Tuple components keyed by name, in declaration order
    Tuple(IndexMap<String, DecodedValue>),
}

impl DecodedValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            DecodedValue::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            DecodedValue::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Short variant name, used in encoder error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DecodedValue::Uint(_) => "uint",
            DecodedValue::Int(_) => "int",
            DecodedValue::Bool(_) => "bool",
            DecodedValue::Address(_) => "address",
            DecodedValue::FixedBytes(_) => "fixed-bytes",
            DecodedValue::Bytes(_) => "bytes",
            DecodedValue::String(_) => "string",
            DecodedValue::Array(_) => "array",
            DecodedValue::Tuple(_) => "tuple",
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Uint(v) => write!(f, "{v}"),
            DecodedValue::Int(v) => write!(f, "{v}"),
            DecodedValue::Bool(v) => write!(f, "{v}"),
            DecodedValue::Address(a) => write!(f, "{}", to_checksum_address(a)),
            DecodedValue::FixedBytes(b) | DecodedValue::Bytes(b) => {
                write!(f, "0x{}", hex::encode(b))
            }
            DecodedValue::String(s) => write!(f, "{s}"),
            DecodedValue::Array(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            DecodedValue::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

/// Report-friendly JSON: integers as decimal strings (they may exceed the
/// JSON number range), addresses checksummed, byte strings as `0x` hex.
impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Uint(v) => serializer.serialize_str(&v.to_string()),
            DecodedValue::Int(v) => serializer.serialize_str(&v.to_string()),
            DecodedValue::Bool(b) => serializer.serialize_bool(*b),
            DecodedValue::Address(a) => serializer.serialize_str(&to_checksum_address(a)),
            DecodedValue::FixedBytes(b) | DecodedValue::Bytes(b) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(b)))
            }
            DecodedValue::String(s) => serializer.serialize_str(s),
            DecodedValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DecodedValue::Tuple(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
