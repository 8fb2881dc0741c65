use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;

/// Byte length of a packed leaf encoding: `uint256 || address || uint256`.
pub const LEAF_ENCODING_LEN: usize = 32 + 20 + 32;

/// Canonical leaf encoding, `abi.encodePacked(uint256 index, address account, uint256 amount)`.
///
/// Every field has a fixed width, so two different triples can never share
/// an encoding.
pub fn encode_leaf(index: u64, account: Address, amount: U256) -> Vec<u8> {
    (U256::from(index), account, amount).abi_encode_packed()
}

/// Leaf hash: `keccak256(keccak256(encode_leaf(..)))`.
///
/// The extra round separates leaves from inner nodes, so a 64-byte inner
/// node preimage cannot be replayed as a leaf.
pub fn leaf_hash(index: u64, account: Address, amount: U256) -> B256 {
    let inner = keccak256(encode_leaf(index, account, amount));
    keccak256(inner)
}

/// Sorted-pair hash: `keccak256(min(a, b) || max(a, b))`, ordered by raw bytes.
pub fn hash_pair(a: B256, b: B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_slice());
    buf[32..].copy_from_slice(hi.as_slice());
    keccak256(buf)
}

/// Root of a tree with no leaves: `keccak256("")`.
pub fn empty_root() -> B256 {
    keccak256(b"")
}
