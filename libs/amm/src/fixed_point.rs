//! Integer constant-product math with exact rounding
//!
//! Every function works on raw token units (`u64`) with a `u128`
//! intermediate, so `a * b` never overflows before the division. Rounding is
//! always toward the pool: a caller never receives a unit the reserves cannot
//! pay for.

use crate::error::MathError;

/// Basis-point denominator (10000 bps = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Largest accepted fee (100%)
pub const MAX_FEE_BPS: u16 = 10_000;

/// Pure integer math functions for constant-product pools
pub struct FixedPointMath;

impl FixedPointMath {
    /// `floor(a * b / d)` using a 128-bit intermediate
    ///
    /// # Errors
    /// * `DivisionByZero` if `d == 0`
    /// * `ArithmeticOverflow` if the quotient does not fit in `u64`
    pub fn mul_div_floor(a: u64, b: u64, d: u64) -> Result<u64, MathError> {
        if d == 0 {
            return Err(MathError::DivisionByZero);
        }
        // u64::MAX * u64::MAX < u128::MAX, the product cannot overflow
        let product = a as u128 * b as u128;
        u64::try_from(product / d as u128).map_err(|_| MathError::ArithmeticOverflow)
    }

    /// Proportional share of a reserve: `floor(amount * numerator_reserve / denominator_reserve)`
    ///
    /// Used for deposit requirements (`lp_amount` of `lp_supply` against a
    /// reserve) and withdrawal payouts.
    pub fn proportional_share(
        amount: u64,
        numerator_reserve: u64,
        denominator_reserve: u64,
    ) -> Result<u64, MathError> {
        Self::mul_div_floor(amount, numerator_reserve, denominator_reserve)
    }

    /// Output of a constant-product swap for an input that has already paid its fee
    ///
    /// Computes `floor(a * reserve_out / (reserve_in + a))`, which is
    /// `reserve_out - ceil(reserve_in * reserve_out / (reserve_in + a))`. The
    /// post-swap reserve is rounded up so `k` never shrinks.
    ///
    /// # Errors
    /// * `EmptyPool` if either reserve is zero
    /// * `ArithmeticOverflow` if `reserve_in + a` overflows `u64`
    pub fn constant_product_output(
        reserve_in: u64,
        reserve_out: u64,
        amount_in_after_fee: u64,
    ) -> Result<u64, MathError> {
        if reserve_in == 0 || reserve_out == 0 {
            return Err(MathError::EmptyPool);
        }
        let new_reserve_in = reserve_in
            .checked_add(amount_in_after_fee)
            .ok_or(MathError::ArithmeticOverflow)?;

        Self::mul_div_floor(amount_in_after_fee, reserve_out, new_reserve_in)
    }

    /// Split an input into `(amount_after_fee, fee_amount)`
    ///
    /// `fee_amount = floor(amount_in * fee_bps / 10000)`. The fee is never
    /// separated from the reserve; it stays in the input side and raises `k`.
    pub fn apply_fee(amount_in: u64, fee_bps: u16) -> Result<(u64, u64), MathError> {
        if fee_bps > MAX_FEE_BPS {
            return Err(MathError::InvalidFee(fee_bps));
        }
        let fee_amount = Self::mul_div_floor(amount_in, fee_bps as u64, BPS_DENOMINATOR)?;
        Ok((amount_in - fee_amount, fee_amount))
    }

    /// The invariant `k = x * y` as a 128-bit value
    #[inline]
    pub fn constant_product(reserve_x: u64, reserve_y: u64) -> u128 {
        reserve_x as u128 * reserve_y as u128
    }
}
