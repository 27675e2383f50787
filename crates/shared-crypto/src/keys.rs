//! # Account Keys
//!
//! Ed25519 where every internal SHA-512 is replaced by Blake2b-512: the
//! expanded secret is `Blake2b-512(private_key)` and signing hashes with
//! Blake2b-512 as well.
//!
//! ## Security Properties
//!
//! - Deterministic signatures, no RNG at signing time
//! - Private key bytes are zeroized on drop

use crate::CryptoError;
use blake2::{Blake2b512, Digest};
use ed25519_dalek::hazmat::{raw_sign, raw_verify, ExpandedSecretKey};
use ed25519_dalek::VerifyingKey;
use shared_types::{Account, PublicKey, Signature};
use std::fmt;
use zeroize::Zeroizing;

/// Key pair for one account.
pub struct NanoKeyPair {
    private_key: Zeroizing<[u8; 32]>,
    expanded: ExpandedSecretKey,
    verifying_key: VerifyingKey,
}

impl NanoKeyPair {
    /// Derive from a 32-byte private key.
    pub fn from_private_key(private_key: [u8; 32]) -> Self {
        let private_key = Zeroizing::new(private_key);
        let mut digest = Zeroizing::new([0u8; 64]);
        digest.copy_from_slice(&Blake2b512::digest(private_key.as_slice()));
        let expanded = ExpandedSecretKey::from_bytes(&digest);
        let verifying_key = VerifyingKey::from(&expanded);
        Self {
            private_key,
            expanded,
            verifying_key,
        }
    }

    /// Parse a 64-character hex private key.
    pub fn from_hex(private_key_hex: &str) -> Result<Self, CryptoError> {
        let hex_str = private_key_hex.trim();
        if hex_str.len() != 64 {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(hex_str, bytes.as_mut_slice())
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self::from_private_key(*bytes))
    }

    /// Random key pair.
    pub fn generate() -> Self {
        Self::from_private_key(rand::random())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.verifying_key.to_bytes())
    }

    pub fn account(&self) -> Account {
        Account::from_public_key(self.public_key())
    }

    /// Sign a message (in practice always a 32-byte block hash).
    pub fn sign(&self, message: &[u8]) -> Signature {
        let signature = raw_sign::<Blake2b512>(&self.expanded, message, &self.verifying_key);
        Signature::from_bytes(signature.to_bytes())
    }

    /// Private key as hex; only for export paths.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode_upper(self.private_key.as_slice()))
    }
}

impl fmt::Debug for NanoKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NanoKeyPair")
            .field("account", &self.account())
            .finish_non_exhaustive()
    }
}

/// Verify `signature` over `message` for `public_key`.
pub fn verify_signature(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key.as_bytes()).map_err(|_| CryptoError::InvalidPublicKey)?;
    let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    raw_verify::<Blake2b512>(&verifying_key, message, &signature)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}
