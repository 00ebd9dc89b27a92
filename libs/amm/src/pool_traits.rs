//! Pool trait definitions for a unified quoting interface

use crate::{ConstantProductCurve, MathError};

/// Unified read-only pool interface
pub trait AmmPool {
    /// Calculate output amount for given input (fee included in `amount_in`)
    fn get_amount_out(&self, is_x_to_y: bool, amount_in: u64) -> Result<u64, MathError>;

    /// Get current reserves as `(x, y)`
    fn get_liquidity(&self) -> (u64, u64);

    /// Get fee tier
    fn get_fee_bps(&self) -> u16;
}

impl AmmPool for ConstantProductCurve {
    fn get_amount_out(&self, is_x_to_y: bool, amount_in: u64) -> Result<u64, MathError> {
        self.quote_swap(is_x_to_y, amount_in).map(|q| q.amount_out)
    }

    fn get_liquidity(&self) -> (u64, u64) {
        (self.reserve_x, self.reserve_y)
    }

    fn get_fee_bps(&self) -> u16 {
        self.fee_bps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_object_quotes() {
        let pool: Box<dyn AmmPool> = Box::new(ConstantProductCurve::new(1000, 2000, 1000, 0));
        assert_eq!(pool.get_amount_out(true, 100).unwrap(), 181);
        assert_eq!(pool.get_liquidity(), (1000, 2000));
        assert_eq!(pool.get_fee_bps(), 0);
    }
}
