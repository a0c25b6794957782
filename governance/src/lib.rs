//! Stake-weighted governance for the Agora engine.
//!
//! Proposal lifecycle: Active → Accepted | Rejected, both terminal.
//! A treasury proposal that is Accepted may additionally be executed once.
//!
//! Key principles:
//! - one account = one vote per proposal, weighted by voting power
//! - quorum is measured against all registered voting power, not turnout
//! - approval is measured against participating power, so a bare majority
//!   fails whenever the approval threshold is above 50%

pub mod error;
pub mod proposal;
pub mod registry;
pub mod tally;

pub use error::{GovernanceError, TreasuryDefect};
pub use proposal::{Proposal, ProposalId, ProposalStatus, TreasuryTransfer};
pub use registry::ProposalRegistry;
pub use tally::{Outcome, Tally};
