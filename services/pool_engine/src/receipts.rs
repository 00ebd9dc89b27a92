//! Results of successful pool operations

use serde::{Deserialize, Serialize};
use types::{Identity, MintId, PoolId};

/// Parameters for creating a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeParams {
    pub initializer: Identity,
    pub mint_x: MintId,
    pub mint_y: MintId,
    pub seed: u64,
    pub fee_bps: u16,
    pub authority: Option<Identity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeReceipt {
    pub pool_id: PoolId,
    pub mint_lp: MintId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub x_in: u64,
    pub y_in: u64,
    pub lp_minted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub is_x_to_y: bool,
    /// Full input moved into the pool, fee included
    pub amount_in: u64,
    pub fee: u64,
    pub amount_out: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub lp_burned: u64,
    pub x_out: u64,
    pub y_out: u64,
}

/// Engine-wide counters
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub pools: usize,
    pub deposits: u64,
    pub swaps: u64,
    pub withdrawals: u64,
    pub lock_changes: u64,
    pub rejected: u64,
    /// Cumulative fees retained on the X side
    pub fees_x: u128,
    /// Cumulative fees retained on the Y side
    pub fees_y: u128,
}
