//! # Shared Types Crate
//!
//! Protocol value types used by every Nano MCP subsystem.
//!
//! ## Design Principles
//!
//! - **Exact amounts**: balances are `Raw` (u128, the protocol's balance
//!   width); decimal conversion works on digit strings and never touches
//!   floating point.
//! - **Validated at the edge**: `Account`, `BlockHash` and `WorkToken` can only
//!   be constructed from well-formed input, so the orchestrators never see a
//!   malformed address or hash.
//! - **Wire-compatible serde**: every type serializes the way the node RPC
//!   expects (uppercase hex hashes, decimal-string balances, 16-char work).
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | `amount` | `Raw` newtype with checked arithmetic |
//! | `units` | `raw_to_decimal` / `decimal_to_raw` (30 decimals) |
//! | `hash` | `BlockHash`, `PublicKey`, `Link`, `Signature` |
//! | `account` | `nano_` address codec |
//! | `work` | `WorkToken`, `BlockKind`, `BlockSubtype`, difficulty thresholds |
//! | `entities` | `AccountState`, `PendingBlock`, `StateBlock` |
//! | `validation` | boolean predicates for precondition checks |
//! | `humantime_serde` | `"30s"` / `"500ms"` duration fields in config |

pub mod account;
pub mod amount;
pub mod entities;
pub mod hash;
pub mod humantime_serde;
pub mod units;
pub mod validation;
pub mod work;

pub use account::{Account, AccountError, ADDRESS_PREFIX, LEGACY_PREFIX};
pub use amount::Raw;
pub use entities::{AccountState, PendingBlock, StateBlock};
pub use hash::{BlockHash, HexError, Link, PublicKey, Signature};
pub use units::{decimal_to_raw, raw_to_decimal, UnitError, RAW_DECIMALS};
pub use validation::{
    is_valid_account, is_valid_block_hash, is_valid_decimal_amount, is_valid_private_key,
    is_valid_raw_amount,
};
pub use work::{BlockKind, BlockSubtype, WorkToken, RECEIVE_DIFFICULTY, SEND_DIFFICULTY};
