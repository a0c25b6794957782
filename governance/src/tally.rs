//! Quorum and approval arithmetic.
//!
//! All divisions floor. Quorum is a percentage of *registered* voting power,
//! `floor(total_voting_stake / tokens_per_vote_power)`, taken at finalization
//! time. Approval is a percentage of the power that actually voted.

use crate::error::GovernanceError;
use agora_types::mul_div;
use serde::{Deserialize, Serialize};

/// For/against voting power on one proposal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub for_votes: u128,
    pub against_votes: u128,
}

/// Result of weighing a tally against the thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Too little participation; nothing is decided.
    QuorumNotReached { have: u128, need: u128 },
    Accepted,
    Rejected,
}

impl Tally {
    pub fn new(for_votes: u128, against_votes: u128) -> Self {
        Self {
            for_votes,
            against_votes,
        }
    }

    pub fn total(&self) -> Result<u128, GovernanceError> {
        self.for_votes
            .checked_add(self.against_votes)
            .ok_or(GovernanceError::Overflow)
    }

    /// `floor(for * 100 / total)`, or `None` when nobody voted.
    pub fn approval_ratio(&self) -> Result<Option<u128>, GovernanceError> {
        let total = self.total()?;
        if total == 0 {
            return Ok(None);
        }
        mul_div(self.for_votes, 100, total)
            .map(Some)
            .ok_or(GovernanceError::Overflow)
    }

    /// Weigh this tally.
    ///
    /// An empty tally only gets past the quorum check when the requirement
    /// itself is zero, and is then rejected.
    pub fn decide(
        &self,
        registered_power: u128,
        quorum_percentage: u32,
        approval_percentage: u32,
    ) -> Result<Outcome, GovernanceError> {
        let total = self.total()?;
        let need = required_quorum(quorum_percentage, registered_power);
        if total < need {
            return Ok(Outcome::QuorumNotReached { have: total, need });
        }
        match self.approval_ratio()? {
            Some(ratio) if ratio >= u128::from(approval_percentage) => Ok(Outcome::Accepted),
            _ => Ok(Outcome::Rejected),
        }
    }
}

/// `floor(quorum_percentage * registered_power / 100)` without overflow.
///
/// Splits the power into hundreds and remainder so the product never exceeds
/// `registered_power` for percentages up to 100.
pub fn required_quorum(quorum_percentage: u32, registered_power: u128) -> u128 {
    let pct = u128::from(quorum_percentage);
    (registered_power / 100) * pct + (registered_power % 100) * pct / 100
}
