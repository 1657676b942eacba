//! Keccak-256 hashing, function selectors, event topic hashes and EIP-55
//! checksummed addresses.
//!
//! A function selector is `keccak256(signature)[..4]`; an event topic hash is
//! the full 32-byte digest of the canonical signature:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef

use alloy_primitives::{Address, B256};
use tiny_keccak::{Hasher, Keccak};

/// 4-byte function selector.
pub type Selector = [u8; 4];

/// Keccak-256 digest of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// Selector of a canonical function signature, e.g. `"transfer(address,uint256)"`.
pub fn selector(signature: &str) -> Selector {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Topic hash of a canonical event signature.
pub fn topic_hash(signature: &str) -> B256 {
    B256::from(keccak256(signature.as_bytes()))
}

/// EIP-55 mixed-case representation of a 20-byte address.
pub fn to_checksum_address(address: &Address) -> String {
    address.to_checksum(None)
}
