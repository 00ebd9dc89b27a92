//! In-process token service
//!
//! Implements [`TokenTransferPort`] with per-mint supply and authority
//! tracking. Used by the CLI and tests; production deployments plug an
//! external custody service into the same trait.

use crate::error::TransferError;
use crate::ports::{AccountOwner, TokenTransferPort};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use types::MintId;

/// Supply and authority of one token type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRecord {
    pub mint: MintId,
    pub decimals: u8,
    pub authority: AccountOwner,
    pub supply: u64,
}

/// One account balance, as persisted in state files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub mint: MintId,
    pub owner: AccountOwner,
    pub amount: u64,
}

/// Serializable copy of the whole token ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedgerSnapshot {
    pub mints: Vec<MintRecord>,
    pub balances: Vec<BalanceRecord>,
}

/// Token balances and mints held in memory
pub struct InMemoryTokenLedger {
    mints: DashMap<MintId, MintRecord>,
    /// Single lock so a transfer's debit and credit land together
    balances: Mutex<HashMap<(MintId, AccountOwner), u64>>,
    next_mint: AtomicU64,
}

impl Default for InMemoryTokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self {
            mints: DashMap::new(),
            balances: Mutex::new(HashMap::new()),
            next_mint: AtomicU64::new(1),
        }
    }

    /// Create a mint and return its id (test and CLI funding helper)
    pub fn create_mint(&self, decimals: u8, authority: AccountOwner) -> MintId {
        let mint = MintId::new(self.next_mint.fetch_add(1, Ordering::SeqCst));
        self.mints.insert(
            mint,
            MintRecord {
                mint,
                decimals,
                authority,
                supply: 0,
            },
        );
        debug!("Created {} ({} decimals) with authority {}", mint, decimals, authority);
        mint
    }

    /// Mint signed by the mint's own authority (test and CLI funding helper)
    pub fn mint_to(&self, mint: MintId, to: AccountOwner, amount: u64) -> Result<(), TransferError> {
        let authority = self
            .mints
            .get(&mint)
            .map(|record| record.authority)
            .ok_or(TransferError::UnknownToken(mint))?;
        self.mint(mint, authority, to, amount)
    }

    pub fn supply(&self, mint: MintId) -> Option<u64> {
        self.mints.get(&mint).map(|record| record.supply)
    }

    pub fn decimals(&self, mint: MintId) -> Option<u8> {
        self.mints.get(&mint).map(|record| record.decimals)
    }

    pub fn snapshot(&self) -> TokenLedgerSnapshot {
        let mut mints: Vec<MintRecord> = self.mints.iter().map(|e| e.value().clone()).collect();
        mints.sort_by_key(|record| record.mint);

        let mut balances: Vec<BalanceRecord> = self
            .balances
            .lock()
            .iter()
            .map(|((mint, owner), amount)| BalanceRecord {
                mint: *mint,
                owner: *owner,
                amount: *amount,
            })
            .collect();
        balances.sort_by_key(|record| (record.mint, record.owner));

        TokenLedgerSnapshot { mints, balances }
    }

    pub fn restore(&self, snapshot: TokenLedgerSnapshot) {
        self.mints.clear();
        let mut highest = 0;
        for record in snapshot.mints {
            highest = highest.max(record.mint.inner());
            self.mints.insert(record.mint, record);
        }
        self.next_mint.store(highest + 1, Ordering::SeqCst);

        let mut balances = self.balances.lock();
        balances.clear();
        for record in snapshot.balances {
            balances.insert((record.mint, record.owner), record.amount);
        }
    }

    fn ensure_mint(&self, mint: MintId) -> Result<(), TransferError> {
        if self.mints.contains_key(&mint) {
            Ok(())
        } else {
            Err(TransferError::UnknownToken(mint))
        }
    }
}

impl TokenTransferPort for InMemoryTokenLedger {
    fn create_token(&self, decimals: u8, authority: AccountOwner) -> Result<MintId, TransferError> {
        Ok(self.create_mint(decimals, authority))
    }

    fn transfer(
        &self,
        token: MintId,
        from: AccountOwner,
        to: AccountOwner,
        amount: u64,
    ) -> Result<(), TransferError> {
        self.ensure_mint(token)?;
        let mut balances = self.balances.lock();

        let available = *balances
            .get(&(token, from))
            .ok_or(TransferError::AccountNotFound { mint: token, owner: from })?;
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                mint: token,
                owner: from,
                available,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = balances
            .get(&(token, to))
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(TransferError::SupplyOverflow(token))?;
        balances.insert((token, from), available - amount);
        balances.insert((token, to), credited);
        Ok(())
    }

    fn mint(
        &self,
        token: MintId,
        authority: AccountOwner,
        to: AccountOwner,
        amount: u64,
    ) -> Result<(), TransferError> {
        let mut record = self
            .mints
            .get_mut(&token)
            .ok_or(TransferError::UnknownToken(token))?;
        if record.authority != authority {
            return Err(TransferError::MintAuthorityError {
                mint: token,
                signer: authority,
            });
        }
        let supply = record
            .supply
            .checked_add(amount)
            .ok_or(TransferError::SupplyOverflow(token))?;

        // Any balance is bounded by supply, so this cannot overflow
        let mut balances = self.balances.lock();
        *balances.entry((token, to)).or_insert(0) += amount;
        record.supply = supply;
        Ok(())
    }

    fn burn(&self, token: MintId, from: AccountOwner, amount: u64) -> Result<(), TransferError> {
        let mut record = self
            .mints
            .get_mut(&token)
            .ok_or(TransferError::UnknownToken(token))?;
        let mut balances = self.balances.lock();

        let available = *balances
            .get(&(token, from))
            .ok_or(TransferError::AccountNotFound { mint: token, owner: from })?;
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                mint: token,
                owner: from,
                available,
                required: amount,
            });
        }
        balances.insert((token, from), available - amount);
        record.supply -= amount;
        Ok(())
    }

    fn balance(&self, token: MintId, owner: AccountOwner) -> u64 {
        self.balances
            .lock()
            .get(&(token, owner))
            .copied()
            .unwrap_or(0)
    }
}
