//! Fixed-width binary values carried as hex on the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hex decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("expected {expected} hex characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("invalid hex: {0}")]
    Invalid(String),
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], HexError> {
    let s = s.trim();
    if s.len() != N * 2 {
        return Err(HexError::Length {
            expected: N * 2,
            actual: s.len(),
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out).map_err(|e| HexError::Invalid(e.to_string()))?;
    Ok(out)
}

macro_rules! fixed_hex_type {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Uppercase hex, the form the node returns.
            pub fn to_hex(&self) -> String {
                hex::encode_upper(self.0)
            }

            /// Parse hex of either case.
            pub fn from_hex(s: &str) -> Result<Self, HexError> {
                decode_fixed::<$len>(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = HexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_hex_type!(
    /// 32-byte Blake2b block hash.
    BlockHash,
    32
);

fixed_hex_type!(
    /// 32-byte ed25519 public key.
    PublicKey,
    32
);

fixed_hex_type!(
    /// The `link` field of a state block: the source block hash for a
    /// receive, the destination public key for a send.
    Link,
    32
);

fixed_hex_type!(
    /// 64-byte ed25519 signature.
    Signature,
    64
);

impl BlockHash {
    /// The frontier of an account that has never been opened.
    pub const ZERO: BlockHash = BlockHash([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl Link {
    pub const ZERO: Link = Link([0u8; 32]);
}

impl From<PublicKey> for BlockHash {
    /// Open blocks compute work against the account key instead of a previous hash.
    fn from(key: PublicKey) -> Self {
        BlockHash(key.0)
    }
}

impl From<BlockHash> for Link {
    fn from(hash: BlockHash) -> Self {
        Link(hash.0)
    }
}

impl From<PublicKey> for Link {
    fn from(key: PublicKey) -> Self {
        Link(key.0)
    }
}
