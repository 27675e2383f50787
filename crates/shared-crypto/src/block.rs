//! State block hashing and signing.

use crate::hashing::blake2b_256;
use crate::keys::{verify_signature, NanoKeyPair};
use crate::CryptoError;
use shared_types::{Account, BlockHash, Link, PublicKey, Raw, StateBlock, WorkToken};

/// Preamble for state blocks: 32 bytes, value 6.
const STATE_BLOCK_PREAMBLE: [u8; 32] = {
    let mut preamble = [0u8; 32];
    preamble[31] = 6;
    preamble
};

/// Direction and size of the balance change a block makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceDelta {
    /// Receive/open: balance grows by the pending amount.
    Credit(Raw),
    /// Send: balance shrinks by the transfer amount.
    Debit(Raw),
}

/// Everything needed to build a state block except the final balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    pub account: Account,
    /// Current frontier, or `BlockHash::ZERO` for an open block.
    pub previous: BlockHash,
    pub representative: Account,
    /// Balance before this block.
    pub wallet_balance: Raw,
    pub delta: BalanceDelta,
    pub link: Link,
    pub work: WorkToken,
}

impl BlockTemplate {
    /// Balance after the delta is applied.
    pub fn resulting_balance(&self) -> Result<Raw, CryptoError> {
        match self.delta {
            BalanceDelta::Credit(amount) => self.wallet_balance.checked_add(amount).ok_or_else(|| {
                CryptoError::BalanceOverflow {
                    balance: self.wallet_balance.to_string(),
                    amount: amount.to_string(),
                }
            }),
            BalanceDelta::Debit(amount) => self.wallet_balance.checked_sub(amount).ok_or_else(|| {
                CryptoError::BalanceUnderflow {
                    balance: self.wallet_balance.to_string(),
                    amount: amount.to_string(),
                }
            }),
        }
    }
}

/// A signed block together with its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedBlock {
    pub hash: BlockHash,
    pub block: StateBlock,
}

/// Blake2b-256 over preamble, account, previous, representative, balance
/// (16 bytes big-endian) and link.
pub fn hash_state_block(
    account: &PublicKey,
    previous: &BlockHash,
    representative: &PublicKey,
    balance: Raw,
    link: &Link,
) -> BlockHash {
    BlockHash::from_bytes(blake2b_256(&[
        &STATE_BLOCK_PREAMBLE,
        account.as_bytes(),
        previous.as_bytes(),
        representative.as_bytes(),
        &balance.as_u128().to_be_bytes(),
        link.as_bytes(),
    ]))
}

/// Compute the final balance, hash and sign.
pub fn sign_state_block(
    template: &BlockTemplate,
    keys: &NanoKeyPair,
) -> Result<SignedBlock, CryptoError> {
    let signer = keys.account();
    if signer != template.account {
        return Err(CryptoError::KeyMismatch {
            expected: template.account.to_string(),
            actual: signer.to_string(),
        });
    }

    let balance = template.resulting_balance()?;
    let hash = hash_state_block(
        &template.account.public_key(),
        &template.previous,
        &template.representative.public_key(),
        balance,
        &template.link,
    );
    let signature = keys.sign(hash.as_bytes());

    Ok(SignedBlock {
        hash,
        block: StateBlock {
            block_type: StateBlock::TYPE.to_string(),
            account: template.account,
            previous: template.previous,
            representative: template.representative,
            balance,
            link: template.link,
            signature,
            work: template.work,
        },
    })
}

/// Recompute the hash and check the signature against the block's account.
pub fn verify_state_block(block: &StateBlock) -> Result<BlockHash, CryptoError> {
    let hash = hash_state_block(
        &block.account.public_key(),
        &block.previous,
        &block.representative.public_key(),
        block.balance,
        &block.link,
    );
    verify_signature(&block.account.public_key(), hash.as_bytes(), &block.signature)?;
    Ok(hash)
}
