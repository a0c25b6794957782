//! Stake ledger for the Agora governance engine.
//!
//! Accounts lock tokens for one of two purposes. Voting stake converts into
//! voting power and counts toward the quorum denominator; proposing stake is a
//! bond that admits an account to the proposal registry.
//!
//! This crate handles:
//! - Per-(account, purpose) balances with a lock timer reset on every increase
//! - The running total of voting-purpose stake, kept in lockstep with balances
//! - Conversion of voting stake into integer voting power

pub mod error;
pub mod ledger;
pub mod stake;

pub use error::StakeError;
pub use ledger::StakeLedger;
pub use stake::{StakePurpose, StakeRecord};
