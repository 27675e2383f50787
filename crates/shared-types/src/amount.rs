//! Raw amount newtype.

use crate::units::{self, UnitError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An amount in raw units.
///
/// Balances on the ledger are 128-bit unsigned integers, so `u128` holds every
/// representable balance exactly. Serialized as a decimal string, matching
/// the node RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Raw(u128);

impl Raw {
    pub const ZERO: Raw = Raw(0);

    /// One display unit (10^30 raw).
    pub const ONE_XNO: Raw = Raw(1_000_000_000_000_000_000_000_000_000_000);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Raw) -> Option<Raw> {
        self.0.checked_add(other.0).map(Raw)
    }

    pub fn checked_sub(self, other: Raw) -> Option<Raw> {
        self.0.checked_sub(other.0).map(Raw)
    }

    pub fn saturating_sub(self, other: Raw) -> Raw {
        Raw(self.0.saturating_sub(other.0))
    }

    /// Decimal display string, e.g. `"0.0011"`.
    pub fn to_decimal(&self) -> String {
        // A u128 rendered with to_string is always a valid digit string.
        units::raw_to_decimal(&self.0.to_string()).unwrap_or_else(|_| "0".to_string())
    }

    /// Parse a decimal display amount into raw.
    pub fn from_decimal(decimal: &str) -> Result<Raw, UnitError> {
        units::decimal_to_raw(decimal)?.parse()
    }
}

impl From<u128> for Raw {
    fn from(value: u128) -> Self {
        Raw(value)
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Raw {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UnitError::Empty);
        }
        if s.starts_with('-') {
            return Err(UnitError::Negative);
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
            return Err(UnitError::InvalidCharacter(c));
        }
        s.parse::<u128>().map(Raw).map_err(|_| UnitError::Overflow)
    }
}

impl Serialize for Raw {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Raw {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
