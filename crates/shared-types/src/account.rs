//! Account address codec.
//!
//! An address is `nano_` followed by 60 base-32 characters: 52 encode four
//! zero padding bits plus the 256-bit public key, the last 8 encode a 40-bit
//! Blake2b checksum of the key in reversed byte order. The legacy `xrb_`
//! prefix is accepted on input; output always uses `nano_`.

use crate::hash::PublicKey;
use blake2::digest::consts::U5;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ADDRESS_PREFIX: &str = "nano_";
pub const LEGACY_PREFIX: &str = "xrb_";

const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";
const KEY_CHARS: usize = 52;
const CHECKSUM_CHARS: usize = 8;

type Blake2b40 = Blake2b<U5>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("address must start with nano_ or xrb_")]
    MissingPrefix,

    #[error("address body must be 60 characters, got {0}")]
    Length(usize),

    #[error("invalid address character {0:?}")]
    InvalidCharacter(char),

    #[error("address padding bits are not zero")]
    InvalidPadding,

    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// A validated account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Account(PublicKey);

impl Account {
    pub fn from_public_key(key: PublicKey) -> Self {
        Self(key)
    }

    pub fn public_key(&self) -> PublicKey {
        self.0
    }

    pub fn parse(address: &str) -> Result<Self, AccountError> {
        let address = address.trim();
        let body = address
            .strip_prefix(ADDRESS_PREFIX)
            .or_else(|| address.strip_prefix(LEGACY_PREFIX))
            .ok_or(AccountError::MissingPrefix)?;

        if body.len() != KEY_CHARS + CHECKSUM_CHARS || !body.is_ascii() {
            return Err(AccountError::Length(body.chars().count()));
        }

        let (key_part, checksum_part) = body.split_at(KEY_CHARS);
        let key = PublicKey::from_bytes(decode_base32::<32>(key_part)?);
        let checksum = decode_base32::<5>(checksum_part)?;

        if checksum != checksum_of(&key) {
            return Err(AccountError::ChecksumMismatch);
        }
        Ok(Self(key))
    }

    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(ADDRESS_PREFIX.len() + KEY_CHARS + CHECKSUM_CHARS);
        out.push_str(ADDRESS_PREFIX);
        out.push_str(&encode_base32(self.0.as_bytes()));
        out.push_str(&encode_base32(&checksum_of(&self.0)));
        out
    }
}

fn checksum_of(key: &PublicKey) -> [u8; 5] {
    let digest = Blake2b40::digest(key.as_bytes());
    let mut out = [0u8; 5];
    for (dst, src) in out.iter_mut().zip(digest.iter().rev()) {
        *dst = *src;
    }
    out
}

/// Big-endian bit stream, left-padded with zero bits to a multiple of five.
fn encode_base32(bytes: &[u8]) -> String {
    let total_bits = bytes.len() * 8;
    let chars = total_bits.div_ceil(5);
    let pad = chars * 5 - total_bits;

    let mut out = String::with_capacity(chars);
    for i in 0..chars {
        let mut value = 0usize;
        for j in 0..5 {
            let bit_index = i * 5 + j;
            let bit = if bit_index < pad {
                0
            } else {
                let b = bit_index - pad;
                ((bytes[b / 8] >> (7 - b % 8)) & 1) as usize
            };
            value = (value << 1) | bit;
        }
        out.push(ALPHABET[value] as char);
    }
    out
}

fn decode_base32<const N: usize>(s: &str) -> Result<[u8; N], AccountError> {
    let pad = s.len() * 5 - N * 8;
    let mut out = [0u8; N];

    for (i, c) in s.chars().enumerate() {
        let value = ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(AccountError::InvalidCharacter(c))? as u8;

        for j in 0..5 {
            let bit = (value >> (4 - j)) & 1;
            let bit_index = i * 5 + j;
            if bit_index < pad {
                if bit != 0 {
                    return Err(AccountError::InvalidPadding);
                }
                continue;
            }
            let b = bit_index - pad;
            out[b / 8] |= bit << (7 - b % 8);
        }
    }
    Ok(out)
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.encode())
    }
}

impl FromStr for Account {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
