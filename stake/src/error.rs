//! Stake-ledger errors.

use agora_types::Timestamp;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakeError {
    #[error("stake amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient stake: requested {requested}, available {available}")]
    InsufficientStake { requested: u128, available: u128 },

    #[error("stake is locked until {unlocks_at}")]
    LockTimeNotReached { unlocks_at: Timestamp },

    #[error("arithmetic overflow in stake accounting")]
    Overflow,
}
