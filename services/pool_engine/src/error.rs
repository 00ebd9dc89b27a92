//! Engine and token-port error types

use crate::ports::AccountOwner;
use amm::MathError;
use thiserror::Error;
use types::{MintId, PoolId};

/// Failures reported by a [`TokenTransferPort`](crate::ports::TokenTransferPort)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient funds: {owner} holds {available} of {mint}, needs {required}")]
    InsufficientFunds {
        mint: MintId,
        owner: AccountOwner,
        available: u64,
        required: u64,
    },

    #[error("Token account not found: {owner} has no {mint} account")]
    AccountNotFound { mint: MintId, owner: AccountOwner },

    #[error("Unknown token: {0}")]
    UnknownToken(MintId),

    #[error("Mint authority mismatch for {mint}: signed by {signer}")]
    MintAuthorityError { mint: MintId, signer: AccountOwner },

    #[error("Supply overflow for {0}")]
    SupplyOverflow(MintId),

    #[error("Token service unavailable: {0}")]
    Unavailable(String),

    /// A step failed and undoing the completed prefix failed as well, so
    /// token balances no longer match the pool ledger
    #[error("Step {step} failed ({cause}) and its compensation failed ({undo})")]
    CompensationFailed {
        step: usize,
        cause: Box<TransferError>,
        undo: Box<TransferError>,
    },
}

/// Every way a pool operation can be rejected
///
/// Each precondition has its own variant so callers can tell "retry with
/// looser bounds" from "malformed request" from "system fault".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),

    #[error("Slippage exceeded: {side} computed {computed}, limit {limit}")]
    SlippageExceeded {
        side: &'static str,
        computed: u64,
        limit: u64,
    },

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Pool reserves are empty")]
    EmptyPool,

    #[error("Pool already exists for {mint_x}/{mint_y} seed {seed}")]
    PoolAlreadyExists {
        mint_x: MintId,
        mint_y: MintId,
        seed: u64,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Insufficient funds: {owner} holds {available} of {mint}, needs {required}")]
    InsufficientFunds {
        mint: MintId,
        owner: AccountOwner,
        available: u64,
        required: u64,
    },

    #[error("Pool {0} is locked")]
    PoolLocked(PoolId),

    #[error("Invalid fee: {0} bps exceeds 10000")]
    InvalidFee(u16),

    #[error("Pool mints must differ, got {0} twice")]
    IdenticalMints(MintId),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Token transfer failed: {0}")]
    Transfer(TransferError),
}

impl EngineError {
    /// Stable error code for CLI output and client matching
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidAmount(_) => "InvalidAmount",
            EngineError::SlippageExceeded { .. } => "SlippageExceeded",
            EngineError::ArithmeticOverflow => "ArithmeticOverflow",
            EngineError::DivisionByZero => "DivisionByZero",
            EngineError::EmptyPool => "EmptyPool",
            EngineError::PoolAlreadyExists { .. } => "PoolAlreadyExists",
            EngineError::NotFound(_) => "NotFound",
            EngineError::Unauthorized => "Unauthorized",
            EngineError::InsufficientFunds { .. } => "InsufficientFunds",
            EngineError::PoolLocked(_) => "PoolLocked",
            EngineError::InvalidFee(_) => "InvalidFee",
            EngineError::IdenticalMints(_) => "IdenticalMints",
            EngineError::InvariantViolation(_) => "InvariantViolation",
            EngineError::Transfer(_) => "TransferFailed",
        }
    }

    /// Only a slippage rejection can succeed on resubmission with looser bounds
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::SlippageExceeded { .. })
    }
}

impl From<MathError> for EngineError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ArithmeticOverflow => EngineError::ArithmeticOverflow,
            MathError::DivisionByZero => EngineError::DivisionByZero,
            MathError::EmptyPool => EngineError::EmptyPool,
            MathError::InvalidFee(fee_bps) => EngineError::InvalidFee(fee_bps),
        }
    }
}

impl From<TransferError> for EngineError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InsufficientFunds {
                mint,
                owner,
                available,
                required,
            } => EngineError::InsufficientFunds {
                mint,
                owner,
                available,
                required,
            },
            err @ TransferError::CompensationFailed { .. } => {
                EngineError::InvariantViolation(err.to_string())
            }
            other => EngineError::Transfer(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Identity;

    #[test]
    fn test_math_errors_keep_their_kind() {
        assert_eq!(EngineError::from(MathError::EmptyPool).code(), "EmptyPool");
        assert_eq!(
            EngineError::from(MathError::ArithmeticOverflow).code(),
            "ArithmeticOverflow"
        );
        assert_eq!(EngineError::from(MathError::DivisionByZero).code(), "DivisionByZero");
        assert_eq!(EngineError::from(MathError::InvalidFee(20_000)), EngineError::InvalidFee(20_000));
    }

    #[test]
    fn test_insufficient_funds_propagates() {
        let owner = AccountOwner::User(Identity::from_name("alice").unwrap());
        let err = EngineError::from(TransferError::InsufficientFunds {
            mint: MintId::new(1),
            owner,
            available: 5,
            required: 10,
        });
        assert_eq!(err.code(), "InsufficientFunds");
        assert!(err.to_string().contains("user:alice"));

        let err = EngineError::from(TransferError::UnknownToken(MintId::new(9)));
        assert_eq!(err.code(), "TransferFailed");
    }

    #[test]
    fn test_failed_compensation_is_an_invariant_violation() {
        let err = EngineError::from(TransferError::CompensationFailed {
            step: 2,
            cause: Box::new(TransferError::Unavailable("payout".to_string())),
            undo: Box::new(TransferError::Unavailable("refund".to_string())),
        });
        assert_eq!(err.code(), "InvariantViolation");
        assert!(err.to_string().contains("payout"));
        assert!(err.to_string().contains("refund"));
    }

    #[test]
    fn test_only_slippage_is_retryable() {
        let slippage = EngineError::SlippageExceeded {
            side: "out",
            computed: 1,
            limit: 2,
        };
        assert!(slippage.is_retryable());
        assert!(!EngineError::InvalidAmount("zero").is_retryable());
        assert!(!EngineError::ArithmeticOverflow.is_retryable());
    }
}
