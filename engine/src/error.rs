use agora_governance::{GovernanceError, ProposalId, TreasuryDefect};
use agora_stake::StakeError;
use agora_types::{AccountId, GatewayError, ParamError, Timestamp};
use thiserror::Error;

/// Every way an engine operation can be refused.
///
/// A returned error means the operation had no effect: no state changed,
/// no event was recorded, and no asset moved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DaoError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("proposal {0} not found")]
    InvalidProposal(ProposalId),

    #[error("invalid treasury proposal: {0}")]
    InvalidTreasuryProposal(TreasuryDefect),

    #[error("insufficient stake: have {have}, need {need}")]
    InsufficientStake { have: u128, need: u128 },

    #[error("stake is locked until {unlocks_at}")]
    LockTimeNotReached { unlocks_at: Timestamp },

    #[error("account {voter} has already voted on proposal {proposal}")]
    AlreadyVoted { proposal: ProposalId, voter: AccountId },

    #[error("proposal {0} does not accept this action now")]
    VotingNotAllowed(ProposalId),

    #[error("quorum not reached: {have} < {need} votes")]
    QuorumNotReached { have: u128, need: u128 },

    #[error("proposal {0} is not executable")]
    ProposalNotExecutable(ProposalId),

    #[error("panic wallet is not set")]
    PanicWalletNotSet,

    #[error("DAO is paused")]
    DaoIsPaused,

    #[error("{0} is not the panic wallet")]
    NotPanicWallet(AccountId),

    #[error("{0} is not the owner")]
    UnauthorizedAccount(AccountId),

    #[error("asset transfer failed: {0}")]
    TransferFailed(#[from] GatewayError),

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<ParamError> for DaoError {
    fn from(e: ParamError) -> Self {
        Self::InvalidParameter(e.to_string())
    }
}

impl From<StakeError> for DaoError {
    fn from(e: StakeError) -> Self {
        match e {
            StakeError::ZeroAmount => Self::InvalidParameter(e.to_string()),
            StakeError::InsufficientStake {
                requested,
                available,
            } => Self::InsufficientStake {
                have: available,
                need: requested,
            },
            StakeError::LockTimeNotReached { unlocks_at } => Self::LockTimeNotReached { unlocks_at },
            StakeError::Overflow => Self::ArithmeticOverflow,
        }
    }
}

impl From<GovernanceError> for DaoError {
    fn from(e: GovernanceError) -> Self {
        match e {
            GovernanceError::InvalidProposal(id) => Self::InvalidProposal(id),
            GovernanceError::InvalidTreasuryProposal(defect) => Self::InvalidTreasuryProposal(defect),
            GovernanceError::InsufficientStake { have, need } => Self::InsufficientStake { have, need },
            GovernanceError::AlreadyVoted { proposal, voter } => Self::AlreadyVoted { proposal, voter },
            GovernanceError::VotingNotAllowed(id) => Self::VotingNotAllowed(id),
            GovernanceError::QuorumNotReached { have, need } => Self::QuorumNotReached { have, need },
            GovernanceError::ProposalNotExecutable(id) => Self::ProposalNotExecutable(id),
            GovernanceError::Overflow => Self::ArithmeticOverflow,
        }
    }
}
