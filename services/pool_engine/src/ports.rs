//! External token custody interface
//!
//! The engine never touches balances directly. Every vault transfer, share
//! mint and share burn goes through a [`TokenTransferPort`], which may live in
//! a separate failure domain.

use crate::error::TransferError;
use serde::{Deserialize, Serialize};
use std::fmt;
use types::{Identity, MintId, PoolId};

/// Owner of a token account
///
/// User accounts belong to a caller identity; vault accounts and the share
/// mint authority belong to a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountOwner {
    User(Identity),
    Pool(PoolId),
}

impl fmt::Display for AccountOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountOwner::User(identity) => match identity.to_name() {
                Some(name) => write!(f, "user:{}", name),
                None => write!(f, "user:0x{}", identity.to_hex()),
            },
            AccountOwner::Pool(pool_id) => write!(f, "pool:{}", pool_id.inner()),
        }
    }
}

/// Token service consumed by the accounting engine
pub trait TokenTransferPort: Send + Sync {
    /// Create a new token type whose supply only `authority` can grow
    fn create_token(&self, decimals: u8, authority: AccountOwner) -> Result<MintId, TransferError>;

    /// Move `amount` of `token` between two accounts
    ///
    /// The destination account is opened on first credit; a missing source
    /// account is `AccountNotFound`.
    fn transfer(
        &self,
        token: MintId,
        from: AccountOwner,
        to: AccountOwner,
        amount: u64,
    ) -> Result<(), TransferError>;

    /// Mint new supply to `to`, signed by `authority`
    fn mint(
        &self,
        token: MintId,
        authority: AccountOwner,
        to: AccountOwner,
        amount: u64,
    ) -> Result<(), TransferError>;

    /// Destroy `amount` held by `from`
    fn burn(&self, token: MintId, from: AccountOwner, amount: u64) -> Result<(), TransferError>;

    /// Current balance, zero for accounts that do not exist
    fn balance(&self, token: MintId, owner: AccountOwner) -> u64;
}
