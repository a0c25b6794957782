use crate::proposal::ProposalId;
use agora_types::AccountId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    InvalidProposal(ProposalId),

    #[error("invalid treasury proposal: {0}")]
    InvalidTreasuryProposal(TreasuryDefect),

    #[error("insufficient stake: have {have}, need {need}")]
    InsufficientStake { have: u128, need: u128 },

    #[error("account {voter} has already voted on proposal {proposal}")]
    AlreadyVoted { proposal: ProposalId, voter: AccountId },

    #[error("proposal {0} does not accept this action now")]
    VotingNotAllowed(ProposalId),

    #[error("quorum not reached: {have} < {need} votes")]
    QuorumNotReached { have: u128, need: u128 },

    #[error("proposal {0} is not executable")]
    ProposalNotExecutable(ProposalId),

    #[error("arithmetic overflow in vote tally")]
    Overflow,
}

/// Why a treasury proposal cannot be created or executed.
///
/// Malformed input at creation and a short treasury at execution surface
/// under the same error kind; the defect tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreasuryDefect {
    #[error("proposal {0} does not exist")]
    UnknownProposal(ProposalId),

    #[error("proposal {0} is not a treasury proposal")]
    NotTreasury(ProposalId),

    #[error("recipient is the null account")]
    NullRecipient,

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("treasury holds {available}, payout needs {needed}")]
    InsufficientFunds { needed: u128, available: u128 },
}
