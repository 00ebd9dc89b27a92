//! Pool Ledger
//!
//! Owned, versioned record of one pool's configuration and reserves, plus the
//! store that hands out per-pool exclusive access. No business logic lives
//! here beyond construction-time validation and invariant checks.

use crate::error::EngineError;
use amm::{ConstantProductCurve, FixedPointMath, MAX_FEE_BPS};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use types::{Identity, MintId, PoolId};

/// Pool identity within the directory: a token pair plus a seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub mint_x: MintId,
    pub mint_y: MintId,
    pub seed: u64,
}

/// Pool configuration, immutable after creation except for `locked`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub seed: u64,
    pub fee_bps: u16,
    /// Identity allowed to lock and unlock; `None` leaves the pool permanently unlocked
    pub authority: Option<Identity>,
    pub mint_x: MintId,
    pub mint_y: MintId,
    /// Share mint, whose mint authority is the pool itself
    pub mint_lp: MintId,
    pub locked: bool,
}

impl PoolConfig {
    pub fn key(&self) -> PoolKey {
        PoolKey {
            mint_x: self.mint_x,
            mint_y: self.mint_y,
            seed: self.seed,
        }
    }

    /// Mints distinct and fee within 0..=10000 bps
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.mint_x == self.mint_y {
            return Err(EngineError::IdenticalMints(self.mint_x));
        }
        if self.fee_bps > MAX_FEE_BPS {
            return Err(EngineError::InvalidFee(self.fee_bps));
        }
        Ok(())
    }
}

/// Vault balances and outstanding share supply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    pub reserve_x: u64,
    pub reserve_y: u64,
    pub lp_supply: u64,
}

impl Reserves {
    pub fn is_empty(&self) -> bool {
        self.reserve_x == 0 && self.reserve_y == 0
    }

    /// `x * y`
    pub fn k(&self) -> u128 {
        FixedPointMath::constant_product(self.reserve_x, self.reserve_y)
    }

    /// `lp_supply == 0` iff both reserves are zero, and a live pool holds both assets
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        if (self.lp_supply == 0) != self.is_empty() {
            return Err(EngineError::InvariantViolation(format!(
                "lp_supply {} with reserves {}/{}",
                self.lp_supply, self.reserve_x, self.reserve_y
            )));
        }
        if self.lp_supply > 0 && (self.reserve_x == 0 || self.reserve_y == 0) {
            return Err(EngineError::InvariantViolation(format!(
                "one-sided reserves {}/{}",
                self.reserve_x, self.reserve_y
            )));
        }
        Ok(())
    }
}

/// Complete state of a single pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolLedger {
    pub pool_id: PoolId,
    pub config: PoolConfig,
    pub reserves: Reserves,
    /// Incremented on every commit
    pub version: u64,
}

impl PoolLedger {
    /// Create an empty, unlocked pool ledger
    pub fn new(pool_id: PoolId, config: PoolConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            pool_id,
            config,
            reserves: Reserves::default(),
            version: 0,
        })
    }

    pub fn is_locked(&self) -> bool {
        self.config.locked
    }

    /// Quoting snapshot of this pool
    pub fn curve(&self) -> ConstantProductCurve {
        ConstantProductCurve::new(
            self.reserves.reserve_x,
            self.reserves.reserve_y,
            self.reserves.lp_supply,
            self.config.fee_bps,
        )
    }

    /// Mint on the input side and the output side of a swap
    pub fn swap_mints(&self, is_x_to_y: bool) -> (MintId, MintId) {
        if is_x_to_y {
            (self.config.mint_x, self.config.mint_y)
        } else {
            (self.config.mint_y, self.config.mint_x)
        }
    }
}

/// Shared handle to one pool's ledger
pub type LedgerHandle = Arc<RwLock<PoolLedger>>;

/// All pool ledgers, one lock per pool
///
/// Writers hold a pool's write lock for the whole operation, which
/// serializes mutations per pool while different pools proceed in parallel.
#[derive(Default)]
pub struct LedgerStore {
    pools: DashMap<PoolId, LedgerHandle>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly created ledger
    pub fn insert(&self, ledger: PoolLedger) -> Result<(), EngineError> {
        match self.pools.entry(ledger.pool_id) {
            Entry::Occupied(_) => {
                let key = ledger.config.key();
                Err(EngineError::PoolAlreadyExists {
                    mint_x: key.mint_x,
                    mint_y: key.mint_y,
                    seed: key.seed,
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(ledger)));
                Ok(())
            }
        }
    }

    /// Lock handle for a pool
    pub fn handle(&self, pool_id: PoolId) -> Result<LedgerHandle, EngineError> {
        self.pools
            .get(&pool_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| EngineError::NotFound(pool_id.to_string()))
    }

    /// Point-in-time copy of a pool's ledger
    pub fn load(&self, pool_id: PoolId) -> Result<PoolLedger, EngineError> {
        let handle = self.handle(pool_id)?;
        let ledger = handle.read().clone();
        Ok(ledger)
    }

    /// Atomically replace the locked ledger with its staged successor
    pub fn commit(current: &mut PoolLedger, mut staged: PoolLedger) {
        staged.version = current.version + 1;
        *current = staged;
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Copies of every ledger, ordered by pool id
    pub fn snapshot(&self) -> Vec<PoolLedger> {
        let mut ledgers: Vec<PoolLedger> = self
            .pools
            .iter()
            .map(|entry| entry.value().read().clone())
            .collect();
        ledgers.sort_by_key(|ledger| ledger.pool_id);
        ledgers
    }

    /// Replace the store's contents with previously snapshotted ledgers
    ///
    /// Every ledger is validated before the store is touched; on error the
    /// previous contents stay in place.
    pub fn restore(&self, ledgers: Vec<PoolLedger>) -> Result<(), EngineError> {
        let mut seen = HashSet::with_capacity(ledgers.len());
        for ledger in &ledgers {
            if !seen.insert(ledger.pool_id) {
                return Err(EngineError::InvariantViolation(format!(
                    "{} appears twice in the restored ledgers",
                    ledger.pool_id
                )));
            }
            if ledger.pool_id.is_null() {
                return Err(EngineError::InvariantViolation(
                    "pool id 0 is reserved".to_string(),
                ));
            }
            ledger.config.validate()?;
            ledger.reserves.check_invariants()?;
        }
        self.pools.clear();
        for ledger in ledgers {
            self.insert(ledger)?;
        }
        Ok(())
    }
}
