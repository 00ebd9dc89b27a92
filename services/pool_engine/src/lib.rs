//! # Pool Engine - Constant-Product Pool Accounting
//!
//! ## Purpose
//!
//! Maintains the authoritative ledger of two-asset constant-product pools:
//! reserves, share supply, fee and lock state. Users deposit both assets for
//! shares, swap one asset for the other, and burn shares for a proportional
//! cut of the reserves. Token custody lives behind [`TokenTransferPort`].
//!
//! ## Architecture
//!
//! ```text
//! caller ──► AccountingEngine ──► LedgerStore (one RwLock per pool)
//!                 │        │
//!                 │        └────► PoolDirectory (mint pair + seed → PoolId)
//!                 ▼
//!           TransferPlan ──────► TokenTransferPort (vaults, share mint)
//! ```
//!
//! ## Guarantees
//!
//! - Operations on one pool are serialized; different pools run in parallel
//! - An operation either commits its ledger change and every token movement,
//!   or leaves both untouched
//! - `reserve_x * reserve_y` never decreases across swaps
//! - All rounding favors the pool
//!
//! ## Example
//!
//! ```rust
//! use pool_engine::{
//!     AccountOwner, AccountingEngine, InMemoryPoolDirectory, InMemoryTokenLedger,
//!     InitializeParams,
//! };
//! use std::sync::Arc;
//! use types::Identity;
//!
//! let tokens = Arc::new(InMemoryTokenLedger::new());
//! let engine = AccountingEngine::new(tokens.clone(), Arc::new(InMemoryPoolDirectory::new()));
//!
//! let alice = Identity::from_name("alice").unwrap();
//! let mint_x = tokens.create_mint(6, AccountOwner::User(alice));
//! let mint_y = tokens.create_mint(6, AccountOwner::User(alice));
//! tokens.mint_to(mint_x, AccountOwner::User(alice), 1_000_000).unwrap();
//! tokens.mint_to(mint_y, AccountOwner::User(alice), 1_000_000).unwrap();
//!
//! let pool = engine
//!     .initialize(InitializeParams {
//!         initializer: alice,
//!         mint_x,
//!         mint_y,
//!         seed: 1,
//!         fee_bps: 30,
//!         authority: Some(alice),
//!     })
//!     .unwrap();
//!
//! engine.deposit(alice, pool.pool_id, 1_000, 10_000, 20_000).unwrap();
//! let receipt = engine.swap(alice, pool.pool_id, true, 1_000, 1).unwrap();
//! assert!(receipt.amount_out > 0);
//! ```

pub mod directory;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod ports;
pub mod receipts;
pub mod scenario;
pub mod token_ledger;
pub mod transfer_plan;

pub use directory::{DirectoryEntry, InMemoryPoolDirectory, PoolDirectory};
pub use engine::{AccountingEngine, EngineSettings};
pub use error::{EngineError, TransferError};
pub use ledger::{LedgerStore, PoolConfig, PoolKey, PoolLedger, Reserves};
pub use ports::{AccountOwner, TokenTransferPort};
pub use receipts::{
    DepositReceipt, EngineStats, InitializeParams, InitializeReceipt, SwapReceipt,
    WithdrawReceipt,
};
pub use scenario::{EngineState, Scenario, ScenarioRunner, Step, StepOutcome};
pub use token_ledger::{InMemoryTokenLedger, TokenLedgerSnapshot};
pub use transfer_plan::{TokenOp, TransferPlan};
