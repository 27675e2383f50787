//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Private key is not 32 bytes of hex
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Public key is not a valid curve point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// The key pair does not belong to the block's account
    #[error("Key belongs to {actual}, block account is {expected}")]
    KeyMismatch { expected: String, actual: String },

    /// Debit larger than the balance it is taken from
    #[error("Balance underflow: {balance} - {amount}")]
    BalanceUnderflow { balance: String, amount: String },

    /// Credit pushes the balance past 128 bits
    #[error("Balance overflow: {balance} + {amount}")]
    BalanceOverflow { balance: String, amount: String },

    /// Work value below the difficulty threshold
    #[error("Insufficient work: difficulty {difficulty:016x} below threshold {threshold:016x}")]
    InsufficientWork { difficulty: u64, threshold: u64 },
}
