//! Read-only constant-product curve
//!
//! Snapshot of a pool's reserves used for quoting. Integer results go through
//! [`FixedPointMath`] and match what the engine will execute; prices and
//! impact are reported as `Decimal` for display only.

use crate::error::MathError;
use crate::fixed_point::FixedPointMath;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Pool reserves, share supply and fee as seen by a quoting caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantProductCurve {
    pub reserve_x: u64,
    pub reserve_y: u64,
    pub lp_supply: u64,
    pub fee_bps: u16, // Fee in basis points (500 = 5%)
}

/// Result of quoting a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub is_x_to_y: bool,
    /// Full input, fee included
    pub amount_in: u64,
    /// Portion of the input retained as fee
    pub fee: u64,
    pub amount_out: u64,
}

impl ConstantProductCurve {
    pub fn new(reserve_x: u64, reserve_y: u64, lp_supply: u64, fee_bps: u16) -> Self {
        Self {
            reserve_x,
            reserve_y,
            lp_supply,
            fee_bps,
        }
    }

    /// True before the first deposit
    pub fn is_empty(&self) -> bool {
        self.lp_supply == 0 && self.reserve_x == 0 && self.reserve_y == 0
    }

    /// `(reserve_in, reserve_out)` for a swap direction
    pub fn oriented_reserves(&self, is_x_to_y: bool) -> (u64, u64) {
        if is_x_to_y {
            (self.reserve_x, self.reserve_y)
        } else {
            (self.reserve_y, self.reserve_x)
        }
    }

    /// Quote a swap: fee first, then the constant-product output
    pub fn quote_swap(&self, is_x_to_y: bool, amount_in: u64) -> Result<SwapQuote, MathError> {
        let (reserve_in, reserve_out) = self.oriented_reserves(is_x_to_y);
        let (amount_after_fee, fee) = FixedPointMath::apply_fee(amount_in, self.fee_bps)?;
        let amount_out =
            FixedPointMath::constant_product_output(reserve_in, reserve_out, amount_after_fee)?;

        Ok(SwapQuote {
            is_x_to_y,
            amount_in,
            fee,
            amount_out,
        })
    }

    /// Token amounts required to mint `lp_amount` shares at the current ratio
    ///
    /// Not defined for an empty pool, where the depositor sets the price.
    pub fn deposit_amounts(&self, lp_amount: u64) -> Result<(u64, u64), MathError> {
        if self.lp_supply == 0 {
            return Err(MathError::EmptyPool);
        }
        let x = FixedPointMath::proportional_share(lp_amount, self.reserve_x, self.lp_supply)?;
        let y = FixedPointMath::proportional_share(lp_amount, self.reserve_y, self.lp_supply)?;
        Ok((x, y))
    }

    /// Token amounts paid out for burning `lp_amount` shares
    pub fn withdraw_amounts(&self, lp_amount: u64) -> Result<(u64, u64), MathError> {
        if self.lp_supply == 0 {
            return Err(MathError::EmptyPool);
        }
        let x = FixedPointMath::proportional_share(lp_amount, self.reserve_x, self.lp_supply)?;
        let y = FixedPointMath::proportional_share(lp_amount, self.reserve_y, self.lp_supply)?;
        Ok((x, y))
    }

    /// Spot price of X in units of Y
    pub fn spot_price(&self) -> Option<Decimal> {
        if self.reserve_x == 0 {
            return None;
        }
        Some(Decimal::from(self.reserve_y) / Decimal::from(self.reserve_x))
    }

    /// Price impact of a trade as a percentage, ignoring the fee
    pub fn price_impact(&self, is_x_to_y: bool, amount_in: u64) -> Result<Decimal, MathError> {
        let (reserve_in, reserve_out) = self.oriented_reserves(is_x_to_y);
        let amount_out = FixedPointMath::constant_product_output(reserve_in, reserve_out, amount_in)?;

        let price_before = Decimal::from(reserve_out) / Decimal::from(reserve_in);
        let new_reserve_in = reserve_in
            .checked_add(amount_in)
            .ok_or(MathError::ArithmeticOverflow)?;
        let price_after = Decimal::from(reserve_out - amount_out) / Decimal::from(new_reserve_in);

        Ok((price_before - price_after).abs() / price_before * dec!(100))
    }

    /// Invariant `k` of this snapshot
    pub fn k(&self) -> u128 {
        FixedPointMath::constant_product(self.reserve_x, self.reserve_y)
    }
}
