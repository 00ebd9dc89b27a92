//! # AMM Library - Integer Constant-Product Mathematics
//!
//! ## Purpose
//!
//! Pure arithmetic for a two-asset constant-product pool operating on raw
//! `u64` token units. Supplies the pool engine with share computations, fee
//! splitting and swap outputs, and supplies callers with read-only quotes.
//!
//! ## Rounding Policy
//!
//! - Every division truncates toward the pool
//! - Fees stay in the input reserve, so `x * y` only grows across swaps
//! - Intermediates are `u128`; results that do not fit `u64` are errors,
//!   never wrapped or saturated
//!
//! ## Modules
//!
//! - [`fixed_point`]: the primitive functions (`proportional_share`,
//!   `constant_product_output`, `apply_fee`)
//! - [`curve`]: quoting snapshot with `Decimal` spot price and price impact
//! - [`pool_traits`]: the [`AmmPool`] trait

pub mod curve;
pub mod error;
pub mod fixed_point;
pub mod pool_traits;

pub use curve::{ConstantProductCurve, SwapQuote};
pub use error::MathError;
pub use fixed_point::{FixedPointMath, BPS_DENOMINATOR, MAX_FEE_BPS};
pub use pool_traits::AmmPool;

/// Common types for display-side calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
