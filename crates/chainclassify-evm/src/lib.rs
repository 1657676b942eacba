//! # chainclassify-evm
//!
//! EVM ABI handling without an external codec library.
//!
//! ## Implementation notes
//! - `interface` parses the JSON interface description into typed entries
//! - `registry` indexes functions by 4-byte selector and events by topic hash
//! - `codec` decodes (and `encoder` encodes) values using the head-tail layout
//! - Topics[0] → event topic hash; topics[1..] → indexed parameters;
//!   `data` → non-indexed parameters (ABI-encoded tuple)

pub mod call_decoder;
pub mod codec;
pub mod encoder;
pub mod interface;
pub mod log_decoder;
pub mod registry;

pub use call_decoder::decode_call;
pub use codec::{decode_params, decode_value};
pub use encoder::{encode_call, encode_params};
pub use interface::{EntryKind, InterfaceEntry, Parameter, RawEntry, RawParam};
pub use log_decoder::{decode_log, decode_transfer_event, transfer_topic, TRANSFER_SIGNATURE};
pub use registry::InterfaceRegistry;
