//! # Blake2b Hashing
//!
//! Fixed-output Blake2b variants used by the protocol.

use blake2::digest::consts::{U32, U8};
use blake2::{Blake2b, Digest};

/// Block hash function (256-bit output).
pub type Blake2b256 = Blake2b<U32>;

/// Work difficulty function (64-bit output).
pub type Blake2b64 = Blake2b<U8>;

/// Hash the concatenation of `parts` with Blake2b-256.
pub fn blake2b_256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
