//! Decoded function-call output.

use indexmap::IndexMap;
use serde::Serialize;

use crate::hash::Selector;
use crate::types::DecodedValue;

/// Result of decoding a transaction's call data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCall {
    /// Function name (e.g. "transfer", "transitState")
    pub function_name: String,
    /// Canonical signature the selector was derived from
    pub signature: String,
    /// First 4 bytes of the call data
    #[serde(serialize_with = "serialize_selector")]
    pub selector: Selector,
    /// Decoded parameters in declaration order
    pub params: IndexMap<String, DecodedValue>,
}

impl DecodedCall {
    /// Selector as a hex string ("0xaabbccdd")
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }

    /// Look up a decoded parameter by name
    pub fn param(&self, name: &str) -> Option<&DecodedValue> {
        self.params.get(name)
    }
}

fn serialize_selector<S: serde::Serializer>(sel: &Selector, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("0x{}", hex::encode(sel)))
}
