//! Mode-specific classification policies.
//!
//! Each mode is an independent [`Classifier`] over the same
//! [`TransactionContext`] input and [`ClassificationResult`] output. Adding a
//! mode means adding a [`Mode`] variant and its classifier.

use std::str::FromStr;

use chainclassify_core::{to_checksum_address, TransactionContext};
use chainclassify_evm::{decode_call, decode_transfer_event, InterfaceRegistry};
use tracing::debug;

use crate::config::ClassifierParams;
use crate::error::ClassifyError;
use crate::result::ClassificationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Decode call data and flag genesis state transitions
    Privado,
    /// Scan receipt logs for mint transfers
    Civic,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Privado => "privado",
            Self::Civic => "civic",
        }
    }

    /// Whether workers must fetch the receipt before classifying.
    pub fn needs_receipt(self) -> bool {
        matches!(self, Self::Civic)
    }
}

impl FromStr for Mode {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "privado" => Ok(Self::Privado),
            "civic" => Ok(Self::Civic),
            _ => Err(ClassifyError::UnsupportedMode { mode: s.to_string() }),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pure classification policy. Never performs I/O.
pub trait Classifier: Send + Sync {
    fn mode(&self) -> Mode;

    fn classify(
        &self,
        ctx: &TransactionContext,
        registry: &InterfaceRegistry,
        params: &ClassifierParams,
    ) -> ClassificationResult;
}

pub struct PrivadoClassifier;

impl Classifier for PrivadoClassifier {
    fn mode(&self) -> Mode {
        Mode::Privado
    }

    fn classify(
        &self,
        ctx: &TransactionContext,
        registry: &InterfaceRegistry,
        params: &ClassifierParams,
    ) -> ClassificationResult {
        let call = match decode_call(&ctx.input, registry) {
            Ok(call) => call,
            Err(e) => {
                let err = ClassifyError::from(e);
                return ClassificationResult::failed(&ctx.hash, self.mode().as_str(), ctx.timestamp, &err);
            }
        };

        let genesis = call
            .param(&params.genesis_param)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        debug!(hash = %ctx.hash, function = %call.function_name, genesis, "decoded call");

        let mut result = ClassificationResult::new(&ctx.hash, self.mode().as_str(), ctx.timestamp);
        result.function_name = Some(call.function_name);
        result.params = Some(call.params);
        result.is_genesis_transition = Some(genesis);
        result
    }
}

pub struct CivicClassifier;

impl Classifier for CivicClassifier {
    fn mode(&self) -> Mode {
        Mode::Civic
    }

    fn classify(
        &self,
        ctx: &TransactionContext,
        _registry: &InterfaceRegistry,
        params: &ClassifierParams,
    ) -> ClassificationResult {
        // No logs attached means the receipt was never fetched
        let Some(logs) = ctx.logs.as_deref() else {
            let err = ClassifyError::NotFound { hash: ctx.hash.clone() };
            return ClassificationResult::failed(&ctx.hash, self.mode().as_str(), ctx.timestamp, &err);
        };

        let null = to_checksum_address(&params.null_address);
        let mut mints = logs
            .iter()
            .filter_map(decode_transfer_event)
            .filter(|ev| ev.from.eq_ignore_ascii_case(&null));

        let mut result = ClassificationResult::new(&ctx.hash, self.mode().as_str(), ctx.timestamp);
        match mints.next() {
            Some(first) => {
                let count = 1 + mints.count();
                debug!(hash = %ctx.hash, to = %first.to, token_id = %first.token_id, count, "mint found");
                result.is_mint = Some(true);
                result.recipient = Some(first.to);
                result.token_id = Some(first.token_id);
                result.mint_count = Some(count);
            }
            None => {
                result.is_mint = Some(false);
                result.mint_count = Some(0);
                result.note = Some("no mint event found".into());
            }
        }
        result
    }
}

static PRIVADO: PrivadoClassifier = PrivadoClassifier;
static CIVIC: CivicClassifier = CivicClassifier;

pub fn classifier_for(mode: Mode) -> &'static dyn Classifier {
    match mode {
        Mode::Privado => &PRIVADO,
        Mode::Civic => &CIVIC,
    }
}

/// Classify one transaction under the named mode.
///
/// An unknown mode yields a failed result with `UnsupportedMode`, like any
/// other per-item error.
pub fn classify(
    mode: &str,
    ctx: &TransactionContext,
    registry: &InterfaceRegistry,
    params: &ClassifierParams,
) -> ClassificationResult {
    match mode.parse::<Mode>() {
        Ok(m) => classifier_for(m).classify(ctx, registry, params),
        Err(e) => ClassificationResult::failed(&ctx.hash, mode, ctx.timestamp, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};
    use chainclassify_core::{DecodedValue, ErrorKind, RawLog};
    use chainclassify_evm::{encode_call, transfer_topic};

    const ABI: &str = r#"[
        {"type": "function", "name": "transitState", "inputs": [
            {"name": "id", "type": "uint256"},
            {"name": "isOldStateGenesis", "type": "bool"}
        ]}
    ]"#;

    fn registry() -> InterfaceRegistry {
        InterfaceRegistry::from_json(ABI).unwrap()
    }

    fn transit(reg: &InterfaceRegistry, genesis: bool) -> Vec<u8> {
        let entry = reg.functions_named("transitState").next().unwrap();
        encode_call(
            entry,
            &[DecodedValue::Uint(U256::from(7u64)), DecodedValue::Bool(genesis)],
        )
        .unwrap()
    }

    fn ctx(input: Vec<u8>) -> TransactionContext {
        TransactionContext::new("0xabc", input, Address::repeat_byte(0xcc)).with_timestamp(1_700_000_000)
    }

    fn addr_topic(a: Address) -> B256 {
        a.into_word()
    }

    fn transfer(from: Address, to: Address, id: u64) -> RawLog {
        RawLog {
            address: None,
            topics: vec![
                transfer_topic(),
                addr_topic(from),
                addr_topic(to),
                B256::from(U256::from(id).to_be_bytes::<32>()),
            ],
            data: vec![],
        }
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("privado".parse::<Mode>().unwrap(), Mode::Privado);
        assert_eq!(" Civic ".parse::<Mode>().unwrap(), Mode::Civic);
        assert!(matches!("polygonid".parse::<Mode>(), Err(ClassifyError::UnsupportedMode { .. })));
        assert!(Mode::Civic.needs_receipt());
        assert!(!Mode::Privado.needs_receipt());
    }

    #[test]
    fn privado_flags_genesis() {
        let reg = registry();
        let params = ClassifierParams::default();

        let r = classify("privado", &ctx(transit(&reg, true)), &reg, &params);
        assert!(r.success);
        assert_eq!(r.function_name.as_deref(), Some("transitState"));
        assert!(r.is_genesis());
        assert_eq!(r.timestamp, Some(1_700_000_000));

        let r = classify("privado", &ctx(transit(&reg, false)), &reg, &params);
        assert_eq!(r.is_genesis_transition, Some(false));
        assert_eq!(r.is_mint, None);
    }

    #[test]
    fn privado_without_call_data_fails_without_mint_fields() {
        let reg = registry();
        let r = classify("privado", &ctx(vec![]), &reg, &ClassifierParams::default());
        assert!(!r.success);
        assert_eq!(r.error.as_ref().unwrap().kind, ErrorKind::EmptyInput);
        assert_eq!(r.is_mint, None);
        assert_eq!(r.token_id, None);
        assert_eq!(r.recipient, None);
    }

    #[test]
    fn privado_with_partial_selector_is_a_decode_failure() {
        let reg = registry();
        let r = classify("privado", &ctx(vec![0xa9, 0x05, 0x9c]), &reg, &ClassifierParams::default());
        assert!(!r.success);
        assert_eq!(r.error.as_ref().unwrap().kind, ErrorKind::AbiDecodeFailure);
        assert_eq!(r.is_genesis_transition, None);
        assert_eq!(r.is_mint, None);
        assert_eq!(r.token_id, None);
    }

    #[test]
    fn civic_counts_every_mint_and_keeps_the_first() {
        let reg = registry();
        let alice = Address::repeat_byte(0xa1);
        let bob = Address::repeat_byte(0xb0);
        let logs = vec![
            transfer(alice, bob, 1),
            transfer(Address::ZERO, alice, 10),
            transfer(Address::ZERO, bob, 11),
        ];
        let r = classify("civic", &ctx(vec![]).with_logs(logs), &reg, &ClassifierParams::default());
        assert!(r.success);
        assert!(r.is_mint());
        assert_eq!(r.recipient, Some(to_checksum_address(&alice)));
        assert_eq!(r.token_id, Some(U256::from(10u64)));
        assert_eq!(r.mint_count, Some(2));
        assert_eq!(r.function_name, None);
    }

    #[test]
    fn civic_without_mint_is_a_successful_miss() {
        let reg = registry();
        let r = classify("civic", &ctx(vec![]).with_logs(vec![]), &reg, &ClassifierParams::default());
        assert!(r.success);
        assert_eq!(r.is_mint, Some(false));
        assert_eq!(r.note.as_deref(), Some("no mint event found"));
    }

    #[test]
    fn civic_without_receipt_logs_fails() {
        let reg = registry();
        let r = classify("civic", &ctx(vec![]), &reg, &ClassifierParams::default());
        assert!(!r.success);
        assert_eq!(r.error.as_ref().unwrap().kind, ErrorKind::NotFound);
        assert_eq!(r.is_mint, None);
        assert_eq!(r.mint_count, None);
    }

    #[test]
    fn unsupported_mode_is_per_item_failure() {
        let reg = registry();
        let r = classify("unknown", &ctx(vec![1, 2, 3, 4]), &reg, &ClassifierParams::default());
        assert!(!r.success);
        assert_eq!(r.mode, "unknown");
        assert_eq!(r.error.unwrap().kind, ErrorKind::UnsupportedMode);
    }
}
