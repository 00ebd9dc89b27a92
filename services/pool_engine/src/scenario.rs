//! Scenario replay for the `pool_engine` CLI
//!
//! A scenario is a JSON list of steps against named mints, pools and users.
//! Each step produces one [`StepOutcome`]; a step may declare the error code
//! it expects, which lets a scenario assert rejections as well as receipts.
//!
//! ```json
//! [
//!   { "op": "create_mint", "name": "usdc", "authority": "admin" },
//!   { "op": "mint_to", "mint": "usdc", "to": "alice", "amount": 1000 },
//!   { "op": "swap", "pool": "main", "user": "alice", "is_x_to_y": true,
//!     "amount_in": 0, "min_out": 0, "expect": "InvalidAmount" }
//! ]
//! ```
//!
//! Names that start with `0x` are parsed as hex identities; anything else is
//! a short alias. `lp:<pool>` names a pool's share mint.

use crate::directory::{DirectoryEntry, InMemoryPoolDirectory};
use crate::engine::AccountingEngine;
use crate::error::EngineError;
use crate::ledger::PoolLedger;
use crate::ports::{AccountOwner, TokenTransferPort};
use crate::receipts::InitializeParams;
use crate::token_ledger::{InMemoryTokenLedger, TokenLedgerSnapshot};
use anyhow::{Context, Result};
use pool_config::EngineConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use types::{Identity, MintId, PoolId, ValidationError};

fn default_decimals() -> u8 {
    6
}

/// One scenario operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    CreateMint {
        name: String,
        #[serde(default = "default_decimals")]
        decimals: u8,
        authority: String,
    },
    MintTo {
        mint: String,
        to: String,
        amount: u64,
    },
    Initialize {
        pool: String,
        initializer: String,
        mint_x: String,
        mint_y: String,
        #[serde(default)]
        seed: u64,
        /// Falls back to the configured default fee
        #[serde(default)]
        fee_bps: Option<u16>,
        /// Defaults to the initializer; `"none"` creates a pool nobody can lock
        #[serde(default)]
        authority: Option<String>,
    },
    Deposit {
        pool: String,
        user: String,
        amount: u64,
        max_x: u64,
        max_y: u64,
    },
    Swap {
        pool: String,
        user: String,
        is_x_to_y: bool,
        amount_in: u64,
        min_out: u64,
    },
    Withdraw {
        pool: String,
        user: String,
        amount: u64,
        min_x: u64,
        min_y: u64,
    },
    Lock {
        pool: String,
        caller: String,
    },
    Unlock {
        pool: String,
        caller: String,
    },
    QuoteSwap {
        pool: String,
        is_x_to_y: bool,
        amount_in: u64,
    },
    Balance {
        mint: String,
        user: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateMint { .. } => "create_mint",
            Action::MintTo { .. } => "mint_to",
            Action::Initialize { .. } => "initialize",
            Action::Deposit { .. } => "deposit",
            Action::Swap { .. } => "swap",
            Action::Withdraw { .. } => "withdraw",
            Action::Lock { .. } => "lock",
            Action::Unlock { .. } => "unlock",
            Action::QuoteSwap { .. } => "quote_swap",
            Action::Balance { .. } => "balance",
        }
    }
}

/// An action plus the error code it is expected to fail with, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<String>,
}

/// Ordered steps, read from a bare JSON array or `{ "name": .., "steps": [..] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    Steps(Vec<Step>),
    Named(Scenario),
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ScenarioFile = serde_json::from_str(json).context("Invalid scenario JSON")?;
        Ok(match file {
            ScenarioFile::Steps(steps) => Scenario { name: None, steps },
            ScenarioFile::Named(scenario) => scenario,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse scenario {:?}", path))
    }
}

/// Why a step failed
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StepError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Unknown {kind} '{name}'")]
    UnknownName { kind: &'static str, name: String },

    #[error("Invalid identity '{name}': {source}")]
    InvalidIdentity {
        name: String,
        source: ValidationError,
    },
}

impl StepError {
    pub fn code(&self) -> &'static str {
        match self {
            StepError::Engine(err) => err.code(),
            StepError::UnknownName { .. } => "UnknownName",
            StepError::InvalidIdentity { .. } => "InvalidIdentity",
        }
    }
}

/// Result line printed for each step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: usize,
    pub op: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Success when nothing was expected, or failure with the expected code
    pub matched: bool,
}

/// Everything needed to resume a scenario run later
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub tokens: TokenLedgerSnapshot,
    pub directory: Vec<DirectoryEntry>,
    pub pools: Vec<PoolLedger>,
    pub mint_names: BTreeMap<String, MintId>,
    pub pool_names: BTreeMap<String, PoolId>,
}

impl EngineState {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {:?}", path))?;
        serde_json::from_str(&json).with_context(|| format!("Failed to parse state file {:?}", path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to encode state")?;
        fs::write(path, json).with_context(|| format!("Failed to write state file {:?}", path))?;
        info!("Saved {} pools to {:?}", self.pools.len(), path);
        Ok(())
    }
}

/// Drives an engine backed by the in-memory token ledger and directory
pub struct ScenarioRunner {
    engine: AccountingEngine,
    tokens: Arc<InMemoryTokenLedger>,
    directory: Arc<InMemoryPoolDirectory>,
    default_fee_bps: u16,
    mint_names: BTreeMap<String, MintId>,
    pool_names: BTreeMap<String, PoolId>,
}

impl ScenarioRunner {
    pub fn new(config: &EngineConfig) -> Self {
        let tokens = Arc::new(InMemoryTokenLedger::new());
        let directory = Arc::new(InMemoryPoolDirectory::new());
        let engine = AccountingEngine::with_config(tokens.clone(), directory.clone(), config);
        Self {
            engine,
            tokens,
            directory,
            default_fee_bps: config.pools.default_fee_bps,
            mint_names: BTreeMap::new(),
            pool_names: BTreeMap::new(),
        }
    }

    /// Resume from a saved state
    pub fn from_state(config: &EngineConfig, state: EngineState) -> Result<Self, EngineError> {
        let mut runner = Self::new(config);
        runner.tokens.restore(state.tokens);
        runner.directory.restore(&state.directory);
        runner.engine.restore_ledgers(state.pools)?;
        runner.mint_names = state.mint_names;
        runner.pool_names = state.pool_names;
        debug!(
            "Restored {} pools and {} named mints",
            runner.engine.stats().pools,
            runner.mint_names.len()
        );
        Ok(runner)
    }

    pub fn state(&self) -> EngineState {
        EngineState {
            tokens: self.tokens.snapshot(),
            directory: self.directory.entries(),
            pools: self.engine.ledgers(),
            mint_names: self.mint_names.clone(),
            pool_names: self.pool_names.clone(),
        }
    }

    pub fn engine(&self) -> &AccountingEngine {
        &self.engine
    }

    pub fn tokens(&self) -> &InMemoryTokenLedger {
        &self.tokens
    }

    pub fn pool_id(&self, name: &str) -> Option<PoolId> {
        self.pool_names.get(name).copied()
    }

    pub fn mint_id(&self, name: &str) -> Option<MintId> {
        self.resolve_mint(name).ok()
    }

    pub fn run(&mut self, scenario: &Scenario) -> Vec<StepOutcome> {
        if let Some(name) = &scenario.name {
            info!("Running scenario '{}' ({} steps)", name, scenario.steps.len());
        }
        scenario
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| self.apply(index + 1, step))
            .collect()
    }

    pub fn apply(&mut self, index: usize, step: &Step) -> StepOutcome {
        let outcome = self.execute(&step.action);
        let mut line = StepOutcome {
            step: index,
            op: step.action.name().to_string(),
            ok: outcome.is_ok(),
            result: None,
            error: None,
            message: None,
            expected: step.expect.clone(),
            matched: false,
        };
        match outcome {
            Ok(result) => {
                line.matched = step.expect.is_none();
                line.result = Some(result);
            }
            Err(err) => {
                line.matched = step.expect.as_deref() == Some(err.code());
                line.error = Some(err.code().to_string());
                line.message = Some(err.to_string());
            }
        }
        line
    }

    fn execute(&mut self, action: &Action) -> Result<Value, StepError> {
        match action {
            Action::CreateMint {
                name,
                decimals,
                authority,
            } => {
                let authority = AccountOwner::User(parse_identity(authority)?);
                let mint = self.tokens.create_mint(*decimals, authority);
                self.mint_names.insert(name.clone(), mint);
                Ok(json!({ "mint": mint }))
            }
            Action::MintTo { mint, to, amount } => {
                let mint = self.resolve_mint(mint)?;
                let to = AccountOwner::User(parse_identity(to)?);
                self.tokens
                    .mint_to(mint, to, *amount)
                    .map_err(EngineError::from)?;
                Ok(json!({ "balance": self.tokens.balance(mint, to) }))
            }
            Action::Initialize {
                pool,
                initializer,
                mint_x,
                mint_y,
                seed,
                fee_bps,
                authority,
            } => {
                let initializer = parse_identity(initializer)?;
                let authority = match authority.as_deref() {
                    None => Some(initializer),
                    Some("none") => None,
                    Some(raw) => Some(parse_identity(raw)?),
                };
                let receipt = self.engine.initialize(InitializeParams {
                    initializer,
                    mint_x: self.resolve_mint(mint_x)?,
                    mint_y: self.resolve_mint(mint_y)?,
                    seed: *seed,
                    fee_bps: fee_bps.unwrap_or(self.default_fee_bps),
                    authority,
                })?;
                self.pool_names.insert(pool.clone(), receipt.pool_id);
                Ok(to_json(&receipt))
            }
            Action::Deposit {
                pool,
                user,
                amount,
                max_x,
                max_y,
            } => {
                let receipt = self.engine.deposit(
                    parse_identity(user)?,
                    self.resolve_pool(pool)?,
                    *amount,
                    *max_x,
                    *max_y,
                )?;
                Ok(to_json(&receipt))
            }
            Action::Swap {
                pool,
                user,
                is_x_to_y,
                amount_in,
                min_out,
            } => {
                let receipt = self.engine.swap(
                    parse_identity(user)?,
                    self.resolve_pool(pool)?,
                    *is_x_to_y,
                    *amount_in,
                    *min_out,
                )?;
                Ok(to_json(&receipt))
            }
            Action::Withdraw {
                pool,
                user,
                amount,
                min_x,
                min_y,
            } => {
                let receipt = self.engine.withdraw(
                    parse_identity(user)?,
                    self.resolve_pool(pool)?,
                    *amount,
                    *min_x,
                    *min_y,
                )?;
                Ok(to_json(&receipt))
            }
            Action::Lock { pool, caller } => {
                let pool_id = self.resolve_pool(pool)?;
                self.engine.lock(parse_identity(caller)?, pool_id)?;
                Ok(json!({ "pool_id": pool_id, "locked": true }))
            }
            Action::Unlock { pool, caller } => {
                let pool_id = self.resolve_pool(pool)?;
                self.engine.unlock(parse_identity(caller)?, pool_id)?;
                Ok(json!({ "pool_id": pool_id, "locked": false }))
            }
            Action::QuoteSwap {
                pool,
                is_x_to_y,
                amount_in,
            } => {
                let pool_id = self.resolve_pool(pool)?;
                let quote = self.engine.quote_swap(pool_id, *is_x_to_y, *amount_in)?;
                let curve = self.engine.pool(pool_id)?.curve();
                let impact = curve
                    .price_impact(*is_x_to_y, *amount_in)
                    .map_err(EngineError::from)?;
                Ok(json!({
                    "quote": quote,
                    "spot_price": curve.spot_price().map(|p| p.to_string()),
                    "price_impact_pct": impact.round_dp(6).to_string(),
                }))
            }
            Action::Balance { mint, user } => {
                let mint = self.resolve_mint(mint)?;
                let owner = AccountOwner::User(parse_identity(user)?);
                Ok(json!({ "balance": self.tokens.balance(mint, owner) }))
            }
        }
    }

    fn resolve_pool(&self, name: &str) -> Result<PoolId, StepError> {
        self.pool_names
            .get(name)
            .copied()
            .ok_or_else(|| StepError::UnknownName {
                kind: "pool",
                name: name.to_string(),
            })
    }

    fn resolve_mint(&self, name: &str) -> Result<MintId, StepError> {
        if let Some(pool) = name.strip_prefix("lp:") {
            let pool_id = self.resolve_pool(pool)?;
            return Ok(self.engine.pool(pool_id)?.config.mint_lp);
        }
        self.mint_names
            .get(name)
            .copied()
            .ok_or_else(|| StepError::UnknownName {
                kind: "mint",
                name: name.to_string(),
            })
    }
}

/// `0x`-prefixed hex, or a short alias
pub fn parse_identity(raw: &str) -> Result<Identity, StepError> {
    let parsed = if raw.starts_with("0x") {
        Identity::from_hex(raw)
    } else {
        Identity::from_name(raw)
    };
    parsed.map_err(|source| StepError::InvalidIdentity {
        name: raw.to_string(),
        source,
    })
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new(&EngineConfig::default())
    }

    fn setup_steps() -> &'static str {
        r#"[
            { "op": "create_mint", "name": "x", "authority": "admin" },
            { "op": "create_mint", "name": "y", "authority": "admin" },
            { "op": "mint_to", "mint": "x", "to": "alice", "amount": 1000000 },
            { "op": "mint_to", "mint": "y", "to": "alice", "amount": 1000000 },
            { "op": "initialize", "pool": "main", "initializer": "admin",
              "mint_x": "x", "mint_y": "y", "seed": 7, "fee_bps": 500 },
            { "op": "deposit", "pool": "main", "user": "alice",
              "amount": 1000, "max_x": 50000, "max_y": 30000 }
        ]"#
    }

    #[test]
    fn test_parse_both_layouts() {
        let bare = Scenario::from_json(setup_steps()).unwrap();
        assert_eq!(bare.steps.len(), 6);
        assert_eq!(bare.name, None);

        let named = Scenario::from_json(
            r#"{ "name": "tiny", "steps": [
                { "op": "lock", "pool": "main", "caller": "admin", "expect": "Unauthorized" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(named.name.as_deref(), Some("tiny"));
        assert_eq!(named.steps[0].expect.as_deref(), Some("Unauthorized"));
        assert_eq!(named.steps[0].action.name(), "lock");

        assert!(Scenario::from_json(r#"[{ "op": "explode" }]"#).is_err());
    }

    #[test]
    fn test_run_setup_and_expectations() {
        let mut runner = runner();
        let outcomes = runner.run(&Scenario::from_json(setup_steps()).unwrap());
        assert!(outcomes.iter().all(|o| o.ok && o.matched), "{:?}", outcomes);

        let pool_id = runner.pool_id("main").unwrap();
        let ledger = runner.engine().pool(pool_id).unwrap();
        assert_eq!(ledger.reserves.reserve_x, 50_000);
        assert_eq!(ledger.reserves.lp_supply, 1_000);
        assert_eq!(ledger.config.authority, Identity::from_name("admin").ok());

        let zero_swap = Step {
            action: Action::Swap {
                pool: "main".into(),
                user: "alice".into(),
                is_x_to_y: true,
                amount_in: 0,
                min_out: 0,
            },
            expect: Some("InvalidAmount".into()),
        };
        let outcome = runner.apply(7, &zero_swap);
        assert!(!outcome.ok);
        assert!(outcome.matched);

        let unexpected = Step {
            expect: Some("SlippageExceeded".into()),
            ..zero_swap
        };
        assert!(!runner.apply(8, &unexpected).matched);
    }

    #[test]
    fn test_unknown_names_and_identities() {
        let mut runner = runner();
        let step = Step {
            action: Action::Balance {
                mint: "nope".into(),
                user: "alice".into(),
            },
            expect: None,
        };
        assert_eq!(runner.apply(1, &step).error.as_deref(), Some("UnknownName"));

        assert!(parse_identity("0x1234").is_err());
        assert!(parse_identity("a-name-that-is-much-longer-than-32-bytes").is_err());
        assert_eq!(
            parse_identity(&format!("0x{}", "00".repeat(32))).unwrap(),
            Identity::default()
        );
    }

    #[test]
    fn test_lp_mint_alias() {
        let mut runner = runner();
        runner.run(&Scenario::from_json(setup_steps()).unwrap());
        let outcome = runner.apply(
            7,
            &Step {
                action: Action::Balance {
                    mint: "lp:main".into(),
                    user: "alice".into(),
                },
                expect: None,
            },
        );
        assert_eq!(outcome.result, Some(json!({ "balance": 1000 })));
    }

    #[test]
    fn test_state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut runner = runner();
        runner.run(&Scenario::from_json(setup_steps()).unwrap());
        runner.state().save(&path).unwrap();

        let state = EngineState::load(&path).unwrap();
        let resumed = ScenarioRunner::from_state(&EngineConfig::default(), state).unwrap();
        let pool_id = resumed.pool_id("main").unwrap();
        assert_eq!(
            resumed.engine().pool(pool_id).unwrap(),
            runner.engine().pool(pool_id).unwrap()
        );
        assert_eq!(
            resumed.engine().resolve(
                resumed.mint_id("x").unwrap(),
                resumed.mint_id("y").unwrap(),
                7
            ),
            Ok(pool_id)
        );
        assert!(resumed.engine().reconcile(pool_id).is_ok());
    }
}
