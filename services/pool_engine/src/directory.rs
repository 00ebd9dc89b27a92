//! Pool Directory
//!
//! Resolves a pool's id from its token pair and seed, and hands out ids for
//! new pools.

use crate::error::EngineError;
use crate::ledger::{PoolConfig, PoolKey};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use types::{MintId, PoolId};

/// Lookup service for pool identities
pub trait PoolDirectory: Send + Sync {
    /// Pool registered for `(mint_x, mint_y, seed)`, or `NotFound`
    fn resolve(&self, mint_x: MintId, mint_y: MintId, seed: u64) -> Result<PoolId, EngineError>;

    /// Record a new pool; `PoolAlreadyExists` if its key is taken
    fn register(&self, pool_id: PoolId, config: &PoolConfig) -> Result<(), EngineError>;

    /// Reserve an id for a pool about to be created
    fn next_pool_id(&self) -> PoolId;
}

/// One directory entry, as persisted in state files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub key: PoolKey,
    pub pool_id: PoolId,
}

/// Concurrent in-process directory
pub struct InMemoryPoolDirectory {
    pools: DashMap<PoolKey, PoolId>,
    next_id: AtomicU64,
}

impl Default for InMemoryPoolDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPoolDirectory {
    pub fn new() -> Self {
        Self {
            pools: DashMap::new(),
            // Id 0 stays reserved as the null pool
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// All registered pools, ordered by id
    pub fn entries(&self) -> Vec<DirectoryEntry> {
        let mut entries: Vec<DirectoryEntry> = self
            .pools
            .iter()
            .map(|entry| DirectoryEntry {
                key: *entry.key(),
                pool_id: *entry.value(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.pool_id);
        entries
    }

    /// Rebuild from persisted entries; the id counter resumes after the highest id
    pub fn restore(&self, entries: &[DirectoryEntry]) {
        self.pools.clear();
        let mut highest = 0;
        for entry in entries {
            self.pools.insert(entry.key, entry.pool_id);
            highest = highest.max(entry.pool_id.inner());
        }
        self.next_id.store(highest + 1, Ordering::SeqCst);
    }
}

impl PoolDirectory for InMemoryPoolDirectory {
    fn resolve(&self, mint_x: MintId, mint_y: MintId, seed: u64) -> Result<PoolId, EngineError> {
        let key = PoolKey {
            mint_x,
            mint_y,
            seed,
        };
        self.pools.get(&key).map(|entry| *entry.value()).ok_or_else(|| {
            EngineError::NotFound(format!("pool for {}/{} seed {}", mint_x, mint_y, seed))
        })
    }

    fn register(&self, pool_id: PoolId, config: &PoolConfig) -> Result<(), EngineError> {
        let key = config.key();
        match self.pools.entry(key) {
            Entry::Occupied(_) => Err(EngineError::PoolAlreadyExists {
                mint_x: key.mint_x,
                mint_y: key.mint_y,
                seed: key.seed,
            }),
            Entry::Vacant(slot) => {
                slot.insert(pool_id);
                debug!("Registered {} for {:?}", pool_id, key);
                Ok(())
            }
        }
    }

    fn next_pool_id(&self) -> PoolId {
        PoolId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> PoolConfig {
        PoolConfig {
            seed,
            fee_bps: 30,
            authority: None,
            mint_x: MintId::new(1),
            mint_y: MintId::new(2),
            mint_lp: MintId::new(3),
            locked: false,
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let directory = InMemoryPoolDirectory::new();
        let pool_id = directory.next_pool_id();
        assert_eq!(pool_id, PoolId::new(1));

        directory.register(pool_id, &config(42)).unwrap();
        assert_eq!(directory.resolve(MintId::new(1), MintId::new(2), 42), Ok(pool_id));

        // Seed and mint order are part of the identity
        assert!(directory.resolve(MintId::new(1), MintId::new(2), 43).is_err());
        assert!(directory.resolve(MintId::new(2), MintId::new(1), 42).is_err());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let directory = InMemoryPoolDirectory::new();
        directory.register(PoolId::new(1), &config(42)).unwrap();
        let err = directory.register(PoolId::new(2), &config(42)).unwrap_err();
        assert_eq!(err.code(), "PoolAlreadyExists");
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_restore_resumes_ids() {
        let directory = InMemoryPoolDirectory::new();
        directory.register(PoolId::new(5), &config(1)).unwrap();
        let entries = directory.entries();

        let restored = InMemoryPoolDirectory::new();
        restored.restore(&entries);
        assert_eq!(restored.next_pool_id(), PoolId::new(6));
        assert_eq!(restored.resolve(MintId::new(1), MintId::new(2), 1), Ok(PoolId::new(5)));
    }
}
