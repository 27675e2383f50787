//! # Shared Crypto - Nano Block Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Blake2b-256 / Blake2b-64 | Block hashes, work difficulty |
//! | `keys` | Ed25519 with Blake2b-512 | Account keys and block signatures |
//! | `block` | State block layout | Hash, sign and verify state blocks |
//! | `work` | Blake2b-64 over `work ‖ root` | Proof-of-work validation |
//!
//! ## Balance Rule
//!
//! `sign_state_block` receives the balance *before* the operation and a
//! signed delta, and computes the post-operation balance itself. Callers
//! never pre-apply the amount, so it cannot be applied twice.

#![warn(missing_docs)]
#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod errors;
pub mod hashing;
pub mod keys;
pub mod work;

// Re-exports
pub use block::{
    hash_state_block, sign_state_block, verify_state_block, BalanceDelta, BlockTemplate,
    SignedBlock,
};
pub use errors::CryptoError;
pub use hashing::{blake2b_256, Blake2b256, Blake2b64};
pub use keys::{verify_signature, NanoKeyPair};
pub use work::{meets_threshold, validate_work, work_difficulty};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
