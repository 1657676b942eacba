//! Interface description parsing.
//!
//! The input is the standard Ethereum JSON ABI: an array of entries with a
//! `type`, a `name` and an ordered `inputs` list. Only `function` and `event`
//! entries are kept; constructors, errors, fallback and receive entries are
//! ignored.

use chainclassify_core::{
    error::RegistryError,
    hash::{selector, topic_hash, Selector},
    types::AbiType,
};
use alloy_primitives::B256;
use serde::Deserialize;

/// One entry of the JSON interface description, as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<RawParam>,
    #[serde(default)]
    pub anonymous: bool,
}

fn default_entry_type() -> String {
    // "type" may be omitted for functions
    "function".into()
}

/// One parameter of a raw entry. Tuple parameters carry `components`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub components: Vec<RawParam>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Function,
    Event,
}

/// A typed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Declared name; unnamed parameters become `arg{i}`
    pub name: String,
    pub ty: AbiType,
    /// Only meaningful for event parameters
    pub indexed: bool,
}

/// A callable function or an event, with its parameters resolved to `AbiType`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceEntry {
    pub kind: EntryKind,
    pub name: String,
    pub params: Vec<Parameter>,
    pub anonymous: bool,
}

impl InterfaceEntry {
    /// Convert a raw entry. Returns `Ok(None)` for entry kinds that are ignored.
    pub fn from_raw(raw: &RawEntry) -> Result<Option<Self>, RegistryError> {
        let kind = match raw.kind.as_str() {
            "function" => EntryKind::Function,
            "event" => EntryKind::Event,
            _ => return Ok(None),
        };

        let params = raw
            .inputs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let ty = parse_param_type(p).map_err(|ty| RegistryError::InvalidAbiType {
                    entry: raw.name.clone(),
                    ty,
                })?;
                Ok(Parameter {
                    name: param_name(&p.name, i),
                    ty,
                    indexed: p.indexed,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;

        Ok(Some(Self {
            kind,
            name: raw.name.clone(),
            params,
            anonymous: raw.anonymous,
        }))
    }

    /// Canonical signature, e.g. `"transfer(address,uint256)"`.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// 4-byte function selector.
    pub fn selector(&self) -> Selector {
        selector(&self.signature())
    }

    /// 32-byte event topic hash.
    pub fn topic_hash(&self) -> B256 {
        topic_hash(&self.signature())
    }

    /// Parameter types in declaration order.
    pub fn types(&self) -> Vec<AbiType> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }
}

fn param_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("arg{index}")
    } else {
        name.to_string()
    }
}

/// Resolve a raw parameter's `type` string (plus `components` for tuples)
/// into an `AbiType`. On failure returns the offending type string.
pub fn parse_param_type(param: &RawParam) -> Result<AbiType, String> {
    let ty = parse_type(&param.ty, &param.components)?;
    ty.validate().map_err(|_| param.ty.clone())?;
    Ok(ty)
}

/// Parse a canonical Solidity type spelling. Array suffixes are peeled from the
/// right, so `uint8[2][]` is a dynamic array of `uint8[2]`.
pub fn parse_type(s: &str, components: &[RawParam]) -> Result<AbiType, String> {
    let s = s.trim();
    if let Some(stripped) = s.strip_suffix(']') {
        let open = stripped.rfind('[').ok_or_else(|| s.to_string())?;
        let inner = parse_type(&stripped[..open], components)?;
        let len_str = &stripped[open + 1..];
        if len_str.is_empty() {
            return Ok(AbiType::Array(Box::new(inner)));
        }
        let len: usize = len_str.parse().map_err(|_| s.to_string())?;
        if len == 0 {
            return Err(s.to_string());
        }
        return Ok(AbiType::FixedArray(Box::new(inner), len));
    }

    match s {
        "address" => Ok(AbiType::Address),
        "bool" => Ok(AbiType::Bool),
        "string" => Ok(AbiType::String),
        "bytes" => Ok(AbiType::Bytes),
        "byte" => Ok(AbiType::FixedBytes(1)),
        "uint" => Ok(AbiType::Uint(256)),
        "int" => Ok(AbiType::Int(256)),
        "tuple" => {
            let fields = components
                .iter()
                .enumerate()
                .map(|(i, c)| Ok((param_name(&c.name, i), parse_type(&c.ty, &c.components)?)))
                .collect::<Result<Vec<_>, String>>()?;
            Ok(AbiType::Tuple(fields))
        }
        _ => {
            if let Some(bits) = s.strip_prefix("uint") {
                bits.parse().map(AbiType::Uint).map_err(|_| s.to_string())
            } else if let Some(bits) = s.strip_prefix("int") {
                bits.parse().map(AbiType::Int).map_err(|_| s.to_string())
            } else if let Some(n) = s.strip_prefix("bytes") {
                n.parse().map(AbiType::FixedBytes).map_err(|_| s.to_string())
            } else {
                Err(s.to_string())
            }
        }
    }
}
