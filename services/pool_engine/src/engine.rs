//! Accounting Engine
//!
//! The four pool state transitions (initialize, deposit, swap, withdraw) and
//! authority-gated lock/unlock.
//!
//! Every mutating operation follows the same two-phase shape:
//!
//! 1. take the pool's write lock and stage a copy of its ledger
//! 2. validate preconditions and compute amounts on the staged copy
//! 3. execute the token transfer plan through the port (compensated on failure)
//! 4. commit the staged ledger only after every transfer succeeded
//!
//! A failure at any step leaves both the ledger and token balances untouched.

use crate::directory::PoolDirectory;
use crate::error::EngineError;
use crate::ledger::{LedgerStore, PoolConfig, PoolLedger, Reserves};
use crate::ports::{AccountOwner, TokenTransferPort};
use crate::receipts::{
    DepositReceipt, EngineStats, InitializeParams, InitializeReceipt, SwapReceipt,
    WithdrawReceipt,
};
use crate::transfer_plan::{TokenOp, TransferPlan};
use amm::{SwapQuote, MAX_FEE_BPS};
use parking_lot::RwLock;
use pool_config::{EngineConfig, LP_DECIMALS, MAX_ROUNDING_DUST};
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::{Identity, MintId, PoolId};

/// Engine behaviour switches derived from [`EngineConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Decimals of newly created share mints
    pub lp_decimals: u8,
    /// Re-check reserve invariants on the staged ledger before executing transfers
    pub verify_invariants: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            lp_decimals: LP_DECIMALS,
            verify_invariants: true,
        }
    }
}

impl From<&EngineConfig> for EngineSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            lp_decimals: config.pools.lp_decimals,
            verify_invariants: config.features.verify_invariants,
        }
    }
}

/// Pool accounting engine
///
/// Shareable across threads via `Arc`; operations on one pool serialize on
/// that pool's lock, operations on different pools run in parallel.
pub struct AccountingEngine {
    store: LedgerStore,
    directory: Arc<dyn PoolDirectory>,
    port: Arc<dyn TokenTransferPort>,
    settings: EngineSettings,
    stats: RwLock<EngineStats>,
}

impl AccountingEngine {
    pub fn new(port: Arc<dyn TokenTransferPort>, directory: Arc<dyn PoolDirectory>) -> Self {
        Self::with_settings(port, directory, EngineSettings::default())
    }

    pub fn with_config(
        port: Arc<dyn TokenTransferPort>,
        directory: Arc<dyn PoolDirectory>,
        config: &EngineConfig,
    ) -> Self {
        Self::with_settings(port, directory, EngineSettings::from(config))
    }

    pub fn with_settings(
        port: Arc<dyn TokenTransferPort>,
        directory: Arc<dyn PoolDirectory>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store: LedgerStore::new(),
            directory,
            port,
            settings,
            stats: RwLock::new(EngineStats::default()),
        }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    // ------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------

    /// Create a pool for `(mint_x, mint_y, seed)` with empty reserves
    pub fn initialize(&self, params: InitializeParams) -> Result<InitializeReceipt, EngineError> {
        self.try_initialize(&params).inspect_err(|err| {
            self.record_rejection("initialize", None, err);
        })
    }

    fn try_initialize(&self, params: &InitializeParams) -> Result<InitializeReceipt, EngineError> {
        if params.fee_bps > MAX_FEE_BPS {
            return Err(EngineError::InvalidFee(params.fee_bps));
        }
        if params.mint_x == params.mint_y {
            return Err(EngineError::IdenticalMints(params.mint_x));
        }
        if self
            .directory
            .resolve(params.mint_x, params.mint_y, params.seed)
            .is_ok()
        {
            return Err(EngineError::PoolAlreadyExists {
                mint_x: params.mint_x,
                mint_y: params.mint_y,
                seed: params.seed,
            });
        }

        let pool_id = self.directory.next_pool_id();
        let mint_lp = self
            .port
            .create_token(self.settings.lp_decimals, AccountOwner::Pool(pool_id))?;

        let ledger = PoolLedger::new(
            pool_id,
            PoolConfig {
                seed: params.seed,
                fee_bps: params.fee_bps,
                authority: params.authority,
                mint_x: params.mint_x,
                mint_y: params.mint_y,
                mint_lp,
                locked: false,
            },
        )?;

        // A concurrent initialize for the same key loses here
        self.directory.register(pool_id, &ledger.config)?;
        self.store.insert(ledger)?;
        self.stats.write().pools = self.store.len();

        info!(
            "Initialized {} for {}/{} seed {} fee {} bps (lp {}, by {})",
            pool_id,
            params.mint_x,
            params.mint_y,
            params.seed,
            params.fee_bps,
            mint_lp,
            params.initializer
        );
        Ok(InitializeReceipt { pool_id, mint_lp })
    }

    /// Mint `amount` shares to `user` in exchange for both assets
    ///
    /// The first deposit takes exactly `max_x` and `max_y` and sets the price;
    /// later deposits pay `floor(amount * reserve / lp_supply)` of each asset.
    pub fn deposit(
        &self,
        user: Identity,
        pool_id: PoolId,
        amount: u64,
        max_x: u64,
        max_y: u64,
    ) -> Result<DepositReceipt, EngineError> {
        let receipt = self.mutate(pool_id, "deposit", |ledger| {
            ensure_active(ledger)?;
            if amount == 0 {
                return Err(EngineError::InvalidAmount("deposit amount must be positive"));
            }

            let reserves = ledger.reserves;
            let (x_in, y_in) = if reserves.lp_supply == 0 {
                if max_x == 0 || max_y == 0 {
                    return Err(EngineError::InvalidAmount(
                        "first deposit must provide both assets",
                    ));
                }
                (max_x, max_y)
            } else {
                let (x, y) = ledger.curve().deposit_amounts(amount)?;
                if x == 0 || y == 0 {
                    return Err(EngineError::InvalidAmount("deposit rounds to zero"));
                }
                (x, y)
            };
            debug!("{} deposit of {} shares requires {} x / {} y", pool_id, amount, x_in, y_in);

            check_at_most("x", x_in, max_x)?;
            check_at_most("y", y_in, max_y)?;

            ledger.reserves = Reserves {
                reserve_x: checked_add(reserves.reserve_x, x_in)?,
                reserve_y: checked_add(reserves.reserve_y, y_in)?,
                lp_supply: checked_add(reserves.lp_supply, amount)?,
            };

            let owner = AccountOwner::User(user);
            let pool = AccountOwner::Pool(pool_id);
            let mut plan = TransferPlan::new();
            plan.push(TokenOp::Transfer {
                mint: ledger.config.mint_x,
                from: owner,
                to: pool,
                amount: x_in,
            })
            .push(TokenOp::Transfer {
                mint: ledger.config.mint_y,
                from: owner,
                to: pool,
                amount: y_in,
            })
            .push(TokenOp::Mint {
                mint: ledger.config.mint_lp,
                authority: pool,
                to: owner,
                amount,
            });

            Ok((
                DepositReceipt {
                    x_in,
                    y_in,
                    lp_minted: amount,
                },
                plan,
            ))
        })?;

        self.stats.write().deposits += 1;
        info!(
            "Deposit into {}: {} x + {} y for {} shares",
            pool_id, receipt.x_in, receipt.y_in, receipt.lp_minted
        );
        Ok(receipt)
    }

    /// Trade `amount_in` of one asset for at least `min_out` of the other
    pub fn swap(
        &self,
        user: Identity,
        pool_id: PoolId,
        is_x_to_y: bool,
        amount_in: u64,
        min_out: u64,
    ) -> Result<SwapReceipt, EngineError> {
        let receipt = self.mutate(pool_id, "swap", |ledger| {
            ensure_active(ledger)?;
            if amount_in == 0 {
                return Err(EngineError::InvalidAmount("swap input must be positive"));
            }
            if ledger.reserves.is_empty() {
                return Err(EngineError::EmptyPool);
            }

            let curve = ledger.curve();
            let SwapQuote {
                fee, amount_out, ..
            } = curve.quote_swap(is_x_to_y, amount_in)?;
            debug!(
                "{} swap quote: {} in (fee {}) -> {} out",
                pool_id, amount_in, fee, amount_out
            );

            if amount_out == 0 {
                return Err(EngineError::InvalidAmount("swap output rounds to zero"));
            }
            if amount_out < min_out {
                return Err(EngineError::SlippageExceeded {
                    side: "out",
                    computed: amount_out,
                    limit: min_out,
                });
            }

            let (reserve_in, reserve_out) = curve.oriented_reserves(is_x_to_y);
            let new_in = checked_add(reserve_in, amount_in)?;
            let new_out = reserve_out - amount_out;
            let (reserve_x, reserve_y) = if is_x_to_y {
                (new_in, new_out)
            } else {
                (new_out, new_in)
            };

            let k_before = ledger.reserves.k();
            ledger.reserves.reserve_x = reserve_x;
            ledger.reserves.reserve_y = reserve_y;
            if ledger.reserves.k() < k_before {
                return Err(EngineError::InvariantViolation(format!(
                    "k decreased from {} to {}",
                    k_before,
                    ledger.reserves.k()
                )));
            }

            let (mint_in, mint_out) = ledger.swap_mints(is_x_to_y);
            let owner = AccountOwner::User(user);
            let pool = AccountOwner::Pool(pool_id);
            let mut plan = TransferPlan::new();
            plan.push(TokenOp::Transfer {
                mint: mint_in,
                from: owner,
                to: pool,
                amount: amount_in,
            })
            .push(TokenOp::Transfer {
                mint: mint_out,
                from: pool,
                to: owner,
                amount: amount_out,
            });

            Ok((
                SwapReceipt {
                    is_x_to_y,
                    amount_in,
                    fee,
                    amount_out,
                },
                plan,
            ))
        })?;

        {
            let mut stats = self.stats.write();
            stats.swaps += 1;
            if is_x_to_y {
                stats.fees_x += receipt.fee as u128;
            } else {
                stats.fees_y += receipt.fee as u128;
            }
        }
        info!(
            "Swap on {}: {} {} in, {} out (fee {})",
            pool_id,
            receipt.amount_in,
            if is_x_to_y { "x" } else { "y" },
            receipt.amount_out,
            receipt.fee
        );
        Ok(receipt)
    }

    /// Burn `lp_amount` shares for a proportional cut of both reserves
    pub fn withdraw(
        &self,
        user: Identity,
        pool_id: PoolId,
        lp_amount: u64,
        min_x: u64,
        min_y: u64,
    ) -> Result<WithdrawReceipt, EngineError> {
        let receipt = self.mutate(pool_id, "withdraw", |ledger| {
            ensure_active(ledger)?;
            if lp_amount == 0 {
                return Err(EngineError::InvalidAmount("withdraw amount must be positive"));
            }

            let owner = AccountOwner::User(user);
            let mint_lp = ledger.config.mint_lp;
            let held = self.port.balance(mint_lp, owner);
            if held < lp_amount || ledger.reserves.lp_supply < lp_amount {
                return Err(EngineError::InsufficientFunds {
                    mint: mint_lp,
                    owner,
                    available: held.min(ledger.reserves.lp_supply),
                    required: lp_amount,
                });
            }

            let reserves = ledger.reserves;
            let (mut x_out, mut y_out) = ledger.curve().withdraw_amounts(lp_amount)?;
            if lp_amount == reserves.lp_supply {
                // The last shares sweep the vaults
                let dust = (reserves.reserve_x - x_out).max(reserves.reserve_y - y_out);
                if dust > MAX_ROUNDING_DUST {
                    return Err(EngineError::InvariantViolation(format!(
                        "{} units left behind by the last shares of {}",
                        dust, pool_id
                    )));
                }
                x_out = reserves.reserve_x;
                y_out = reserves.reserve_y;
            }
            if x_out == 0 && y_out == 0 {
                return Err(EngineError::InvalidAmount("withdraw pays out nothing"));
            }
            debug!(
                "{} withdraw of {} shares pays {} x / {} y",
                pool_id, lp_amount, x_out, y_out
            );

            check_at_least("x", x_out, min_x)?;
            check_at_least("y", y_out, min_y)?;

            // proportional_share never exceeds the reserve while lp_amount <= lp_supply
            ledger.reserves = Reserves {
                reserve_x: reserves.reserve_x - x_out,
                reserve_y: reserves.reserve_y - y_out,
                lp_supply: reserves.lp_supply - lp_amount,
            };

            let pool = AccountOwner::Pool(pool_id);
            let mut plan = TransferPlan::new();
            plan.push(TokenOp::Burn {
                mint: mint_lp,
                authority: pool,
                from: owner,
                amount: lp_amount,
            })
            .push(TokenOp::Transfer {
                mint: ledger.config.mint_x,
                from: pool,
                to: owner,
                amount: x_out,
            })
            .push(TokenOp::Transfer {
                mint: ledger.config.mint_y,
                from: pool,
                to: owner,
                amount: y_out,
            });

            Ok((
                WithdrawReceipt {
                    lp_burned: lp_amount,
                    x_out,
                    y_out,
                },
                plan,
            ))
        })?;

        self.stats.write().withdrawals += 1;
        info!(
            "Withdraw from {}: {} shares for {} x + {} y",
            pool_id, receipt.lp_burned, receipt.x_out, receipt.y_out
        );
        Ok(receipt)
    }

    /// Pause deposits, swaps and withdrawals
    pub fn lock(&self, caller: Identity, pool_id: PoolId) -> Result<(), EngineError> {
        self.set_locked(caller, pool_id, true)
    }

    /// Resume a locked pool
    pub fn unlock(&self, caller: Identity, pool_id: PoolId) -> Result<(), EngineError> {
        self.set_locked(caller, pool_id, false)
    }

    fn set_locked(&self, caller: Identity, pool_id: PoolId, locked: bool) -> Result<(), EngineError> {
        let operation = if locked { "lock" } else { "unlock" };
        self.mutate(pool_id, operation, |ledger| {
            match ledger.config.authority {
                Some(authority) if authority == caller => {}
                _ => return Err(EngineError::Unauthorized),
            }
            ledger.config.locked = locked;
            Ok(((), TransferPlan::new()))
        })?;

        self.stats.write().lock_changes += 1;
        info!("{} {} by {}", pool_id, if locked { "locked" } else { "unlocked" }, caller);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read-only access
    // ------------------------------------------------------------------

    /// Point-in-time copy of a pool's ledger
    pub fn pool(&self, pool_id: PoolId) -> Result<PoolLedger, EngineError> {
        self.store.load(pool_id)
    }

    pub fn resolve(&self, mint_x: MintId, mint_y: MintId, seed: u64) -> Result<PoolId, EngineError> {
        self.directory.resolve(mint_x, mint_y, seed)
    }

    /// What a swap would pay right now, without executing it
    pub fn quote_swap(
        &self,
        pool_id: PoolId,
        is_x_to_y: bool,
        amount_in: u64,
    ) -> Result<SwapQuote, EngineError> {
        if amount_in == 0 {
            return Err(EngineError::InvalidAmount("swap input must be positive"));
        }
        let ledger = self.store.load(pool_id)?;
        Ok(ledger.curve().quote_swap(is_x_to_y, amount_in)?)
    }

    /// Assets a deposit of `lp_amount` shares would require
    pub fn quote_deposit(&self, pool_id: PoolId, lp_amount: u64) -> Result<(u64, u64), EngineError> {
        let ledger = self.store.load(pool_id)?;
        Ok(ledger.curve().deposit_amounts(lp_amount)?)
    }

    /// Assets a withdrawal of `lp_amount` shares would pay
    pub fn quote_withdraw(&self, pool_id: PoolId, lp_amount: u64) -> Result<(u64, u64), EngineError> {
        let ledger = self.store.load(pool_id)?;
        Ok(ledger.curve().withdraw_amounts(lp_amount)?)
    }

    /// Compare a pool's recorded reserves with its vault balances
    pub fn reconcile(&self, pool_id: PoolId) -> Result<(), EngineError> {
        let handle = self.store.handle(pool_id)?;
        let ledger = handle.read();
        let pool = AccountOwner::Pool(pool_id);
        let vault_x = self.port.balance(ledger.config.mint_x, pool);
        let vault_y = self.port.balance(ledger.config.mint_y, pool);

        if vault_x != ledger.reserves.reserve_x || vault_y != ledger.reserves.reserve_y {
            return Err(EngineError::InvariantViolation(format!(
                "{} vaults hold {}/{} but reserves record {}/{}",
                pool_id, vault_x, vault_y, ledger.reserves.reserve_x, ledger.reserves.reserve_y
            )));
        }
        Ok(())
    }

    pub fn stats(&self) -> EngineStats {
        let mut stats = self.stats.read().clone();
        stats.pools = self.store.len();
        stats
    }

    /// Copies of every pool ledger, ordered by id
    pub fn ledgers(&self) -> Vec<PoolLedger> {
        self.store.snapshot()
    }

    /// Load previously saved ledgers, replacing all current pools
    pub fn restore_ledgers(&self, ledgers: Vec<PoolLedger>) -> Result<(), EngineError> {
        self.store.restore(ledgers)?;
        self.stats.write().pools = self.store.len();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Two-phase mutation
    // ------------------------------------------------------------------

    /// Stage, execute transfers, then commit; any error leaves the pool untouched
    fn mutate<R>(
        &self,
        pool_id: PoolId,
        operation: &'static str,
        apply: impl FnOnce(&mut PoolLedger) -> Result<(R, TransferPlan), EngineError>,
    ) -> Result<R, EngineError> {
        let outcome = self.store.handle(pool_id).and_then(|handle| {
            let mut current = handle.write();
            let mut staged = current.clone();

            let (receipt, plan) = apply(&mut staged)?;
            if self.settings.verify_invariants {
                staged.reserves.check_invariants()?;
            }

            plan.execute(self.port.as_ref())?;
            LedgerStore::commit(&mut current, staged);
            Ok(receipt)
        });

        if let Err(err) = &outcome {
            self.record_rejection(operation, Some(pool_id), err);
        }
        outcome
    }

    fn record_rejection(&self, operation: &str, pool_id: Option<PoolId>, err: &EngineError) {
        self.stats.write().rejected += 1;
        match pool_id {
            Some(pool_id) => warn!("{} on {} rejected [{}]: {}", operation, pool_id, err.code(), err),
            None => warn!("{} rejected [{}]: {}", operation, err.code(), err),
        }
    }
}

fn ensure_active(ledger: &PoolLedger) -> Result<(), EngineError> {
    if ledger.is_locked() {
        return Err(EngineError::PoolLocked(ledger.pool_id));
    }
    Ok(())
}

fn checked_add(a: u64, b: u64) -> Result<u64, EngineError> {
    a.checked_add(b).ok_or(EngineError::ArithmeticOverflow)
}

fn check_at_most(side: &'static str, computed: u64, limit: u64) -> Result<(), EngineError> {
    if computed > limit {
        return Err(EngineError::SlippageExceeded {
            side,
            computed,
            limit,
        });
    }
    Ok(())
}

fn check_at_least(side: &'static str, computed: u64, limit: u64) -> Result<(), EngineError> {
    if computed < limit {
        return Err(EngineError::SlippageExceeded {
            side,
            computed,
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryPoolDirectory;
    use crate::token_ledger::InMemoryTokenLedger;

    struct Fixture {
        engine: AccountingEngine,
        tokens: Arc<InMemoryTokenLedger>,
        mint_x: MintId,
        mint_y: MintId,
        admin: Identity,
    }

    fn fixture() -> Fixture {
        let tokens = Arc::new(InMemoryTokenLedger::new());
        let directory = Arc::new(InMemoryPoolDirectory::new());
        let admin = Identity::from_name("admin").unwrap();
        let mint_x = tokens.create_mint(6, AccountOwner::User(admin));
        let mint_y = tokens.create_mint(6, AccountOwner::User(admin));
        let engine = AccountingEngine::new(tokens.clone(), directory);
        Fixture {
            engine,
            tokens,
            mint_x,
            mint_y,
            admin,
        }
    }

    fn params(f: &Fixture, fee_bps: u16) -> InitializeParams {
        InitializeParams {
            initializer: f.admin,
            mint_x: f.mint_x,
            mint_y: f.mint_y,
            seed: 1,
            fee_bps,
            authority: Some(f.admin),
        }
    }

    #[test]
    fn test_initialize_creates_empty_pool() {
        let f = fixture();
        let receipt = f.engine.initialize(params(&f, 500)).unwrap();

        let ledger = f.engine.pool(receipt.pool_id).unwrap();
        assert_eq!(ledger.config.fee_bps, 500);
        assert_eq!(ledger.config.authority, Some(f.admin));
        assert_eq!(ledger.config.mint_lp, receipt.mint_lp);
        assert!(!ledger.config.locked);
        assert_eq!(ledger.reserves, Reserves::default());
        assert_eq!(f.tokens.decimals(receipt.mint_lp), Some(LP_DECIMALS));
        assert_eq!(f.engine.resolve(f.mint_x, f.mint_y, 1), Ok(receipt.pool_id));
    }

    #[test]
    fn test_initialize_rejections() {
        let f = fixture();
        f.engine.initialize(params(&f, 500)).unwrap();

        let err = f.engine.initialize(params(&f, 500)).unwrap_err();
        assert_eq!(err.code(), "PoolAlreadyExists");

        let mut bad_fee = params(&f, 10_001);
        bad_fee.seed = 2;
        assert_eq!(f.engine.initialize(bad_fee), Err(EngineError::InvalidFee(10_001)));

        let mut same_mint = params(&f, 30);
        same_mint.seed = 3;
        same_mint.mint_y = same_mint.mint_x;
        assert_eq!(
            f.engine.initialize(same_mint),
            Err(EngineError::IdenticalMints(f.mint_x))
        );

        assert_eq!(f.engine.stats().pools, 1);
        assert_eq!(f.engine.stats().rejected, 3);
    }

    #[test]
    fn test_unknown_pool_is_not_found() {
        let f = fixture();
        let err = f.engine.swap(f.admin, PoolId::new(42), true, 1, 0).unwrap_err();
        assert_eq!(err.code(), "NotFound");
    }

    #[test]
    fn test_swap_on_empty_pool() {
        let f = fixture();
        let pool_id = f.engine.initialize(params(&f, 30)).unwrap().pool_id;
        assert_eq!(
            f.engine.swap(f.admin, pool_id, true, 10, 0),
            Err(EngineError::EmptyPool)
        );
        assert_eq!(f.engine.quote_deposit(pool_id, 10), Err(EngineError::EmptyPool));
    }

    #[test]
    fn test_first_deposit_needs_both_assets() {
        let f = fixture();
        let pool_id = f.engine.initialize(params(&f, 30)).unwrap().pool_id;
        let err = f.engine.deposit(f.admin, pool_id, 100, 100, 0).unwrap_err();
        assert_eq!(err.code(), "InvalidAmount");
    }

    #[test]
    fn test_dust_withdraw_keeps_shares() {
        let f = fixture();
        let pool_id = f.engine.initialize(params(&f, 30)).unwrap().pool_id;
        let admin = AccountOwner::User(f.admin);
        f.tokens.mint_to(f.mint_x, admin, 10).unwrap();
        f.tokens.mint_to(f.mint_y, admin, 10).unwrap();
        f.engine.deposit(f.admin, pool_id, 1_000_000, 10, 10).unwrap();
        let before = f.engine.pool(pool_id).unwrap();

        // One share of a million is worth less than a unit of either asset
        let err = f.engine.withdraw(f.admin, pool_id, 1, 0, 0).unwrap_err();
        assert_eq!(err, EngineError::InvalidAmount("withdraw pays out nothing"));
        assert_eq!(f.engine.pool(pool_id).unwrap(), before);
        assert_eq!(f.tokens.balance(before.config.mint_lp, admin), 1_000_000);

        let receipt = f.engine.withdraw(f.admin, pool_id, 100_000, 0, 0).unwrap();
        assert_eq!((receipt.x_out, receipt.y_out), (1, 1));
    }

    #[test]
    fn test_lock_requires_authority() {
        let f = fixture();
        let pool_id = f.engine.initialize(params(&f, 30)).unwrap().pool_id;
        let mallory = Identity::from_name("mallory").unwrap();

        assert_eq!(f.engine.lock(mallory, pool_id), Err(EngineError::Unauthorized));
        f.engine.lock(f.admin, pool_id).unwrap();
        assert!(f.engine.pool(pool_id).unwrap().is_locked());
        assert_eq!(
            f.engine.deposit(f.admin, pool_id, 1, 1, 1),
            Err(EngineError::PoolLocked(pool_id))
        );
        f.engine.unlock(f.admin, pool_id).unwrap();
        assert!(!f.engine.pool(pool_id).unwrap().is_locked());
    }

    #[test]
    fn test_pool_without_authority_cannot_lock() {
        let f = fixture();
        let mut no_authority = params(&f, 30);
        no_authority.authority = None;
        let pool_id = f.engine.initialize(no_authority).unwrap().pool_id;
        assert_eq!(f.engine.lock(f.admin, pool_id), Err(EngineError::Unauthorized));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = EngineConfig::default();
        config.pools.lp_decimals = 9;
        config.features.verify_invariants = false;
        let settings = EngineSettings::from(&config);
        assert_eq!(settings.lp_decimals, 9);
        assert!(!settings.verify_invariants);
    }
}
