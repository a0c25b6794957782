//! Notifications recorded by every committed mutating operation.

use agora_governance::{ProposalId, ProposalStatus};
use agora_stake::StakePurpose;
use agora_types::{amount::decimal, AccountId, DaoParams, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something the engine did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaoEvent {
    Staked {
        account: AccountId,
        purpose: StakePurpose,
        #[serde(with = "decimal")]
        amount: u128,
    },
    Unstaked {
        account: AccountId,
        purpose: StakePurpose,
        #[serde(with = "decimal")]
        amount: u128,
    },
    ProposalCreated {
        id: ProposalId,
        proposer: AccountId,
        title: String,
        treasury: bool,
    },
    VoteCast {
        proposal: ProposalId,
        voter: AccountId,
        support: bool,
        #[serde(with = "decimal")]
        power: u128,
    },
    ProposalFinalized {
        proposal: ProposalId,
        status: ProposalStatus,
    },
    TreasuryProposalExecuted {
        proposal: ProposalId,
        recipient: AccountId,
        #[serde(with = "decimal")]
        amount: u128,
    },
    PanicActivated {
        by: AccountId,
    },
    CalmActivated {
        by: AccountId,
    },
    ParametersUpdated {
        params: DaoParams,
    },
    QuorumUpdated {
        quorum_percentage: u32,
        approval_percentage: u32,
    },
    PanicWalletUpdated {
        account: AccountId,
    },
    OwnershipTransferred {
        previous: AccountId,
        new: AccountId,
    },
    TokensPurchased {
        buyer: AccountId,
        #[serde(with = "decimal")]
        value: u128,
        #[serde(with = "decimal")]
        tokens: u128,
    },
    TokensMinted {
        to: AccountId,
        #[serde(with = "decimal")]
        amount: u128,
    },
    TreasuryFunded {
        from: AccountId,
        #[serde(with = "decimal")]
        amount: u128,
    },
}

impl DaoEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Staked { .. } => "Staked",
            Self::Unstaked { .. } => "Unstaked",
            Self::ProposalCreated { .. } => "ProposalCreated",
            Self::VoteCast { .. } => "VoteCast",
            Self::ProposalFinalized { .. } => "ProposalFinalized",
            Self::TreasuryProposalExecuted { .. } => "TreasuryProposalExecuted",
            Self::PanicActivated { .. } => "PanicActivated",
            Self::CalmActivated { .. } => "CalmActivated",
            Self::ParametersUpdated { .. } => "ParametersUpdated",
            Self::QuorumUpdated { .. } => "QuorumUpdated",
            Self::PanicWalletUpdated { .. } => "PanicWalletUpdated",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
            Self::TokensPurchased { .. } => "TokensPurchased",
            Self::TokensMinted { .. } => "TokensMinted",
            Self::TreasuryFunded { .. } => "TreasuryFunded",
        }
    }
}

/// An event with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, from 0.
    pub seq: u64,
    pub at: Timestamp,
    pub event: DaoEvent,
}

type Listener = Box<dyn Fn(&EventRecord) + Send + Sync>;

/// Append-only event log with synchronous fan-out.
///
/// Listeners are invoked inline on the emitting call, after the operation
/// has committed; keep handlers fast.
#[derive(Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
    listeners: Vec<Listener>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from previously recorded events. Listeners are not restored.
    pub fn from_records(records: Vec<EventRecord>) -> Self {
        Self {
            records,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn emit(&mut self, event: DaoEvent, at: Timestamp) {
        let record = EventRecord {
            seq: self.records.len() as u64,
            at,
            event,
        };
        for listener in &self.listeners {
            listener(&record);
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Events recorded after `seq`, for pollers that remember where they stopped.
    pub fn since(&self, seq: u64) -> &[EventRecord] {
        let start = usize::try_from(seq.saturating_add(1)).unwrap_or(usize::MAX);
        self.records.get(start..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("records", &self.records.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
