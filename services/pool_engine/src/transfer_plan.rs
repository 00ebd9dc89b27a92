//! Transfer plans with compensation
//!
//! An operation's token effects are collected into a [`TransferPlan`] before
//! anything moves. Executing the plan journals each completed step; when a
//! step fails, the completed steps are undone in reverse order so balances
//! end where they started.

use crate::error::TransferError;
use crate::ports::{AccountOwner, TokenTransferPort};
use tracing::{error, warn};
use types::MintId;

/// One token side effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOp {
    Transfer {
        mint: MintId,
        from: AccountOwner,
        to: AccountOwner,
        amount: u64,
    },
    Mint {
        mint: MintId,
        authority: AccountOwner,
        to: AccountOwner,
        amount: u64,
    },
    /// `authority` is the mint authority, needed to re-mint on compensation
    Burn {
        mint: MintId,
        authority: AccountOwner,
        from: AccountOwner,
        amount: u64,
    },
}

impl TokenOp {
    fn execute(&self, port: &dyn TokenTransferPort) -> Result<(), TransferError> {
        match *self {
            TokenOp::Transfer {
                mint,
                from,
                to,
                amount,
            } => port.transfer(mint, from, to, amount),
            TokenOp::Mint {
                mint,
                authority,
                to,
                amount,
            } => port.mint(mint, authority, to, amount),
            TokenOp::Burn {
                mint, from, amount, ..
            } => port.burn(mint, from, amount),
        }
    }

    /// The operation that undoes this one
    pub fn inverse(&self) -> TokenOp {
        match *self {
            TokenOp::Transfer {
                mint,
                from,
                to,
                amount,
            } => TokenOp::Transfer {
                mint,
                from: to,
                to: from,
                amount,
            },
            TokenOp::Mint {
                mint,
                authority,
                to,
                amount,
            } => TokenOp::Burn {
                mint,
                authority,
                from: to,
                amount,
            },
            TokenOp::Burn {
                mint,
                authority,
                from,
                amount,
            } => TokenOp::Mint {
                mint,
                authority,
                to: from,
                amount,
            },
        }
    }

    fn amount(&self) -> u64 {
        match *self {
            TokenOp::Transfer { amount, .. }
            | TokenOp::Mint { amount, .. }
            | TokenOp::Burn { amount, .. } => amount,
        }
    }
}

/// Ordered token side effects of one pool operation
///
/// Engines push every debit of the caller before any credit to the caller,
/// so compensation only ever returns funds to the caller or the pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferPlan {
    ops: Vec<TokenOp>,
}

impl TransferPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step; zero-amount steps are dropped
    pub fn push(&mut self, op: TokenOp) -> &mut Self {
        if op.amount() > 0 {
            self.ops.push(op);
        }
        self
    }

    pub fn ops(&self) -> &[TokenOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Run every step, or none of them
    ///
    /// On failure the completed prefix is compensated in reverse order and the
    /// failing step's error is returned. If any compensation step fails too,
    /// [`TransferError::CompensationFailed`] carries both errors.
    pub fn execute(&self, port: &dyn TokenTransferPort) -> Result<(), TransferError> {
        for (index, op) in self.ops.iter().enumerate() {
            if let Err(err) = op.execute(port) {
                warn!(
                    "Transfer step {} of {} failed ({}), compensating {} completed steps",
                    index + 1,
                    self.ops.len(),
                    err,
                    index
                );
                if let Err(undo) = self.compensate(&self.ops[..index], port) {
                    error!(
                        "Transfer step {} failed ({}) and compensation failed ({}); balances diverged",
                        index + 1,
                        err,
                        undo
                    );
                    return Err(TransferError::CompensationFailed {
                        step: index + 1,
                        cause: Box::new(err),
                        undo: Box::new(undo),
                    });
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Undo every completed step, newest first; the first failure is returned
    /// after the remaining steps have still been attempted
    fn compensate(
        &self,
        completed: &[TokenOp],
        port: &dyn TokenTransferPort,
    ) -> Result<(), TransferError> {
        let mut first_failure = None;
        for op in completed.iter().rev() {
            let undo = op.inverse();
            if let Err(err) = undo.execute(port) {
                error!("Compensation step {:?} failed: {}", undo, err);
                first_failure.get_or_insert(err);
            }
        }
        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_ledger::InMemoryTokenLedger;
    use types::{Identity, PoolId};

    fn user(name: &str) -> AccountOwner {
        AccountOwner::User(Identity::from_name(name).unwrap())
    }

    #[test]
    fn test_inverse_pairs() {
        let mint = MintId::new(1);
        let pool = AccountOwner::Pool(PoolId::new(1));
        let op = TokenOp::Mint {
            mint,
            authority: pool,
            to: user("alice"),
            amount: 5,
        };
        assert_eq!(
            op.inverse(),
            TokenOp::Burn {
                mint,
                authority: pool,
                from: user("alice"),
                amount: 5
            }
        );
        assert_eq!(op.inverse().inverse(), op);
    }

    #[test]
    fn test_zero_steps_dropped() {
        let mut plan = TransferPlan::new();
        plan.push(TokenOp::Transfer {
            mint: MintId::new(1),
            from: user("a"),
            to: user("b"),
            amount: 0,
        });
        assert!(plan.is_empty());
    }

    #[test]
    fn test_failed_step_rolls_back_prefix() {
        let ledger = InMemoryTokenLedger::new();
        let pool = AccountOwner::Pool(PoolId::new(1));
        let x = ledger.create_mint(6, user("admin"));
        let y = ledger.create_mint(6, user("admin"));
        let lp = ledger.create_mint(6, pool);
        ledger.mint_to(x, user("alice"), 100).unwrap();
        ledger.mint_to(y, user("alice"), 5).unwrap();

        let mut plan = TransferPlan::new();
        plan.push(TokenOp::Transfer {
            mint: x,
            from: user("alice"),
            to: pool,
            amount: 100,
        })
        .push(TokenOp::Mint {
            mint: lp,
            authority: pool,
            to: user("alice"),
            amount: 10,
        })
        .push(TokenOp::Transfer {
            mint: y,
            from: user("alice"),
            to: pool,
            amount: 50,
        });

        let err = plan.execute(&ledger).unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { .. }));

        assert_eq!(ledger.balance(x, user("alice")), 100);
        assert_eq!(ledger.balance(x, pool), 0);
        assert_eq!(ledger.balance(lp, user("alice")), 0);
        assert_eq!(ledger.supply(lp), Some(0));
        assert_eq!(ledger.balance(y, user("alice")), 5);
    }
}
