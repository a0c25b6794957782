//! Governance proposals and their lifecycle.

use agora_types::{amount::decimal, AccountId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense proposal identifier, assigned from 0 in creation order.
pub type ProposalId = u64;

/// Where a proposal stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Collecting votes, or closed but not yet finalized.
    Active,
    /// Passed quorum and approval. Terminal.
    Accepted,
    /// Passed quorum but failed approval. Terminal.
    Rejected,
}

impl ProposalStatus {
    /// Numeric code used by external dashboards (0 active, 1 accepted, 2 rejected).
    pub fn code(&self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Accepted => 1,
            Self::Rejected => 2,
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Funds a treasury proposal asks to release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryTransfer {
    pub recipient: AccountId,
    /// Base-currency value in raw units.
    #[serde(with = "decimal")]
    pub amount: u128,
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: AccountId,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    /// Voting closes at this instant; finalization opens.
    pub ends_at: Timestamp,
    /// Voting power cast in favour.
    #[serde(with = "decimal")]
    pub for_votes: u128,
    /// Voting power cast against.
    #[serde(with = "decimal")]
    pub against_votes: u128,
    pub status: ProposalStatus,
    /// Set once, only for accepted treasury proposals whose payout went out.
    pub executed: bool,
    /// Present for treasury proposals.
    pub treasury: Option<TreasuryTransfer>,
}

impl Proposal {
    pub fn is_treasury(&self) -> bool {
        self.treasury.is_some()
    }

    /// Whether a vote cast at `now` falls inside the window.
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.status == ProposalStatus::Active && now < self.ends_at
    }

    /// Total participating power. Saturates; the tally path uses checked math.
    pub fn total_votes(&self) -> u128 {
        self.for_votes.saturating_add(self.against_votes)
    }
}
