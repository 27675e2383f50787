//! Proof-of-work validation.
//!
//! Difficulty is the little-endian u64 of `Blake2b-64(work_le ‖ root)`. A
//! work value is valid when its difficulty is at or above the threshold of
//! the block's kind.

use crate::hashing::Blake2b64;
use crate::CryptoError;
use blake2::Digest;
use shared_types::{BlockHash, BlockKind, WorkToken};

pub fn work_difficulty(root: &BlockHash, work: WorkToken) -> u64 {
    let mut hasher = Blake2b64::new();
    hasher.update(work.value().to_le_bytes());
    hasher.update(root.as_bytes());
    let digest: [u8; 8] = hasher.finalize().into();
    u64::from_le_bytes(digest)
}

pub fn meets_threshold(root: &BlockHash, work: WorkToken, threshold: u64) -> bool {
    work_difficulty(root, work) >= threshold
}

/// Check work against the threshold for `kind`, returning the difficulty.
pub fn validate_work(root: &BlockHash, work: WorkToken, kind: BlockKind) -> Result<u64, CryptoError> {
    let difficulty = work_difficulty(root, work);
    let threshold = kind.difficulty_threshold();
    if difficulty >= threshold {
        Ok(difficulty)
    } else {
        Err(CryptoError::InsufficientWork {
            difficulty,
            threshold,
        })
    }
}
