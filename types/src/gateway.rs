//! The capability through which the engine moves assets.
//!
//! Token and base-currency balances live outside the engine. Every stake,
//! unstake, purchase, mint, and treasury payout is a call into an
//! [`AssetGateway`] whose internals the engine does not know. A call either
//! fully happens or returns an error with no effect.

use crate::address::AccountId;
use thiserror::Error;

/// Why an external asset movement failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("account {account} holds {available}, needs {needed}")]
    InsufficientFunds {
        account: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("custody holds {available}, needs {needed}")]
    InsufficientCustody { needed: u128, available: u128 },

    #[error("transfer to {0} was refused")]
    Refused(AccountId),

    #[error("balance overflow")]
    Overflow,

    #[error("{0}")]
    Other(String),
}

/// External token and value ledger as seen from the engine.
///
/// "Custody" is the engine's own holding: tokens pulled from stakers, tokens
/// minted into the sale reserve, and base-currency value backing the treasury.
pub trait AssetGateway {
    /// Move `amount` tokens from `from` into custody.
    fn pull_tokens(&mut self, from: &AccountId, amount: u128) -> Result<(), GatewayError>;

    /// Move `amount` tokens from custody to `to`.
    fn push_tokens(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError>;

    /// Create `amount` new tokens owned by `to`.
    fn mint_tokens(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError>;

    /// Create `amount` new tokens held in custody.
    fn mint_to_custody(&mut self, amount: u128) -> Result<(), GatewayError>;

    /// Move `amount` base-currency value from `from` into custody.
    fn pull_value(&mut self, from: &AccountId, amount: u128) -> Result<(), GatewayError>;

    /// Move `amount` base-currency value from custody to `to`.
    fn push_value(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError>;
}
