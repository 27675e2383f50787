//! Boolean predicates used for precondition checks before any RPC call.

use crate::account::Account;
use crate::amount::Raw;
use crate::hash::BlockHash;
use crate::units;

pub fn is_valid_account(address: &str) -> bool {
    Account::parse(address).is_ok()
}

/// 64 hex characters.
pub fn is_valid_private_key(key: &str) -> bool {
    let key = key.trim();
    key.len() == 64 && key.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_valid_block_hash(hash: &str) -> bool {
    BlockHash::from_hex(hash).is_ok()
}

/// A non-negative integer that fits the 128-bit balance range.
pub fn is_valid_raw_amount(amount: &str) -> bool {
    amount.parse::<Raw>().is_ok()
}

pub fn is_valid_decimal_amount(amount: &str) -> bool {
    units::decimal_to_raw(amount)
        .map(|raw| raw.parse::<Raw>().is_ok())
        .unwrap_or(false)
}
