//! Shared fixtures for pool engine integration tests

#![allow(dead_code)]

use pool_engine::{
    AccountOwner, AccountingEngine, EngineError, InMemoryPoolDirectory, InMemoryTokenLedger,
    InitializeParams, TokenTransferPort, TransferError,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use types::{Identity, MintId, PoolId};

pub const ONE: u64 = 1_000_000; // 10^6 base units, six decimals

pub fn identity(name: &str) -> Identity {
    Identity::from_name(name).unwrap()
}

pub fn user(name: &str) -> AccountOwner {
    AccountOwner::User(identity(name))
}

/// Token port that fails the next call of a chosen kind, once
pub struct FaultyPort {
    pub inner: Arc<InMemoryTokenLedger>,
    fail_next_mint: AtomicBool,
    fail_next_burn: AtomicBool,
    pool_payouts_to_fail: AtomicU32,
}

impl FaultyPort {
    pub fn new(inner: Arc<InMemoryTokenLedger>) -> Self {
        Self {
            inner,
            fail_next_mint: AtomicBool::new(false),
            fail_next_burn: AtomicBool::new(false),
            pool_payouts_to_fail: AtomicU32::new(0),
        }
    }

    pub fn fail_next_mint(&self) {
        self.fail_next_mint.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_burn(&self) {
        self.fail_next_burn.store(true, Ordering::SeqCst);
    }

    /// Fail the next transfer out of a pool vault
    pub fn fail_next_pool_payout(&self) {
        self.fail_pool_payouts(1);
    }

    /// Fail the next `count` transfers out of any pool vault, refunds included
    pub fn fail_pool_payouts(&self, count: u32) {
        self.pool_payouts_to_fail.store(count, Ordering::SeqCst);
    }

    fn trip(flag: &AtomicBool) -> Result<(), TransferError> {
        if flag.swap(false, Ordering::SeqCst) {
            return Err(TransferError::Unavailable("injected fault".to_string()));
        }
        Ok(())
    }
}

impl TokenTransferPort for FaultyPort {
    fn create_token(&self, decimals: u8, authority: AccountOwner) -> Result<MintId, TransferError> {
        self.inner.create_token(decimals, authority)
    }

    fn transfer(
        &self,
        token: MintId,
        from: AccountOwner,
        to: AccountOwner,
        amount: u64,
    ) -> Result<(), TransferError> {
        if matches!(from, AccountOwner::Pool(_))
            && self
                .pool_payouts_to_fail
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(TransferError::Unavailable("injected fault".to_string()));
        }
        self.inner.transfer(token, from, to, amount)
    }

    fn mint(
        &self,
        token: MintId,
        authority: AccountOwner,
        to: AccountOwner,
        amount: u64,
    ) -> Result<(), TransferError> {
        Self::trip(&self.fail_next_mint)?;
        self.inner.mint(token, authority, to, amount)
    }

    fn burn(&self, token: MintId, from: AccountOwner, amount: u64) -> Result<(), TransferError> {
        Self::trip(&self.fail_next_burn)?;
        self.inner.burn(token, from, amount)
    }

    fn balance(&self, token: MintId, owner: AccountOwner) -> u64 {
        self.inner.balance(token, owner)
    }
}

/// Engine with two fresh six-decimal mints and an `admin` authority
pub struct Harness {
    pub engine: AccountingEngine,
    pub tokens: Arc<InMemoryTokenLedger>,
    pub faults: Option<Arc<FaultyPort>>,
    pub mint_x: MintId,
    pub mint_y: MintId,
    pub admin: Identity,
}

impl Harness {
    pub fn new() -> Self {
        let tokens = Arc::new(InMemoryTokenLedger::new());
        let engine = AccountingEngine::new(tokens.clone(), Arc::new(InMemoryPoolDirectory::new()));
        Self::with_engine(engine, tokens, None)
    }

    /// Engine whose token port can be told to fail
    pub fn faulty() -> Self {
        let tokens = Arc::new(InMemoryTokenLedger::new());
        let faults = Arc::new(FaultyPort::new(tokens.clone()));
        let engine = AccountingEngine::new(faults.clone(), Arc::new(InMemoryPoolDirectory::new()));
        Self::with_engine(engine, tokens, Some(faults))
    }

    fn with_engine(
        engine: AccountingEngine,
        tokens: Arc<InMemoryTokenLedger>,
        faults: Option<Arc<FaultyPort>>,
    ) -> Self {
        let admin = identity("admin");
        let mint_x = tokens.create_mint(6, AccountOwner::User(admin));
        let mint_y = tokens.create_mint(6, AccountOwner::User(admin));
        Self {
            engine,
            tokens,
            faults,
            mint_x,
            mint_y,
            admin,
        }
    }

    pub fn faults(&self) -> &FaultyPort {
        self.faults.as_deref().expect("harness built without fault injection")
    }

    pub fn fund(&self, who: &str, x: u64, y: u64) {
        self.tokens.mint_to(self.mint_x, user(who), x).unwrap();
        self.tokens.mint_to(self.mint_y, user(who), y).unwrap();
    }

    pub fn create_pool(&self, fee_bps: u16) -> PoolId {
        self.engine
            .initialize(InitializeParams {
                initializer: self.admin,
                mint_x: self.mint_x,
                mint_y: self.mint_y,
                seed: fee_bps as u64,
                fee_bps,
                authority: Some(self.admin),
            })
            .unwrap()
            .pool_id
    }

    /// Pool whose first deposit by `lp` sets the given reserves and supply
    pub fn seeded_pool(&self, fee_bps: u16, reserve_x: u64, reserve_y: u64, lp_supply: u64) -> PoolId {
        let pool_id = self.create_pool(fee_bps);
        self.fund("lp", reserve_x, reserve_y);
        self.engine
            .deposit(identity("lp"), pool_id, lp_supply, reserve_x, reserve_y)
            .unwrap();
        pool_id
    }

    pub fn balances(&self, who: &str, pool_id: PoolId) -> (u64, u64, u64) {
        let mint_lp = self.engine.pool(pool_id).unwrap().config.mint_lp;
        (
            self.tokens.balance(self.mint_x, user(who)),
            self.tokens.balance(self.mint_y, user(who)),
            self.tokens.balance(mint_lp, user(who)),
        )
    }

    pub fn vaults(&self, pool_id: PoolId) -> (u64, u64) {
        let pool = AccountOwner::Pool(pool_id);
        (
            self.tokens.balance(self.mint_x, pool),
            self.tokens.balance(self.mint_y, pool),
        )
    }
}

pub fn code(result: Result<impl std::fmt::Debug, EngineError>) -> &'static str {
    match result {
        Ok(value) => panic!("expected an error, got {:?}", value),
        Err(err) => err.code(),
    }
}
