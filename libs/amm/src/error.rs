//! Math error kinds

use thiserror::Error;

/// Failures of the pure integer math layer
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Pool reserves are empty")]
    EmptyPool,

    #[error("Invalid fee: {0} bps exceeds 10000")]
    InvalidFee(u16),
}
