//! Proof-of-work token and the block kinds that determine its difficulty.

use crate::hash::HexError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Minimum difficulty for send and change blocks.
pub const SEND_DIFFICULTY: u64 = 0xfffffff800000000;

/// Minimum difficulty for receive and open blocks.
pub const RECEIVE_DIFFICULTY: u64 = 0xfffffe0000000000;

/// Work class of a block. The cache is keyed on `(root, BlockKind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Send or change.
    Send,
    /// Receive or open.
    Receive,
}

impl BlockKind {
    pub const fn difficulty_threshold(self) -> u64 {
        match self {
            BlockKind::Send => SEND_DIFFICULTY,
            BlockKind::Receive => RECEIVE_DIFFICULTY,
        }
    }

    /// Threshold as the 16-char hex string `work_generate` expects.
    pub fn threshold_hex(self) -> String {
        format!("{:016x}", self.difficulty_threshold())
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BlockKind::Send => "send",
            BlockKind::Receive => "receive",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subtype passed to the `process` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSubtype {
    Open,
    Receive,
    Send,
    Change,
}

impl BlockSubtype {
    pub const fn work_kind(self) -> BlockKind {
        match self {
            BlockSubtype::Open | BlockSubtype::Receive => BlockKind::Receive,
            BlockSubtype::Send | BlockSubtype::Change => BlockKind::Send,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BlockSubtype::Open => "open",
            BlockSubtype::Receive => "receive",
            BlockSubtype::Send => "send",
            BlockSubtype::Change => "change",
        }
    }
}

impl fmt::Display for BlockSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 64-bit work nonce, rendered as 16 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkToken(u64);

impl WorkToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        let s = s.trim();
        if s.len() != 16 {
            return Err(HexError::Length {
                expected: 16,
                actual: s.len(),
            });
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|e| HexError::Invalid(e.to_string()))
    }
}

impl fmt::Display for WorkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for WorkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkToken({})", self.to_hex())
    }
}

impl FromStr for WorkToken {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for WorkToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for WorkToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
