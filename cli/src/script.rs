//! Operation scripts and their replay against a sandboxed engine.
//!
//! A script seeds balances in a [`NullGateway`] and lists timed operations:
//!
//! ```toml
//! [[account]]
//! id = "0x000000000000000000000000000000000000000a"
//! tokens = "1000000000000000000000"
//!
//! [[step]]
//! at = 0
//! caller = "0x000000000000000000000000000000000000000a"
//! op = "stake_for_voting"
//! amount = "100000000000000000000"
//! ```
//!
//! Steps run in file order and must not go back in time.

use agora_engine::{DaoConfig, DaoError, EventRecord, GovernanceDao};
use agora_governance::ProposalId;
use agora_nullables::{NullClock, NullGateway};
use agora_types::{amount::decimal, AccountId, EconomicParams, Timestamp};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Script {
    #[serde(default, rename = "account")]
    pub accounts: Vec<SeedAccount>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// Starting balances for one account in the sandbox.
#[derive(Clone, Debug, Deserialize)]
pub struct SeedAccount {
    pub id: AccountId,
    #[serde(default, with = "decimal")]
    pub tokens: u128,
    #[serde(default, with = "decimal")]
    pub value: u128,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    /// Seconds since the start of the replay.
    pub at: u64,
    pub caller: AccountId,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    StakeForVoting {
        #[serde(with = "decimal")]
        amount: u128,
    },
    StakeForProposing {
        #[serde(with = "decimal")]
        amount: u128,
    },
    UnstakeFromVoting {
        #[serde(with = "decimal")]
        amount: u128,
    },
    UnstakeFromProposing {
        #[serde(with = "decimal")]
        amount: u128,
    },
    CreateProposal {
        title: String,
        #[serde(default)]
        description: String,
    },
    CreateTreasuryProposal {
        title: String,
        #[serde(default)]
        description: String,
        recipient: AccountId,
        #[serde(with = "decimal")]
        amount: u128,
    },
    Vote {
        proposal: ProposalId,
        support: bool,
    },
    Finalize {
        proposal: ProposalId,
    },
    Execute {
        proposal: ProposalId,
    },
    FundTreasury {
        #[serde(with = "decimal")]
        amount: u128,
    },
    BuyTokens {
        #[serde(with = "decimal")]
        value: u128,
    },
    MintTokens {
        to: AccountId,
        #[serde(with = "decimal")]
        amount: u128,
    },
    SetPanicWallet {
        account: AccountId,
    },
    Panic,
    Calm,
    SetParameters {
        params: EconomicParams,
    },
    SetQuorum {
        quorum: u32,
        approval: u32,
    },
    TransferOwnership {
        new_owner: AccountId,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StakeForVoting { .. } => "stake_for_voting",
            Self::StakeForProposing { .. } => "stake_for_proposing",
            Self::UnstakeFromVoting { .. } => "unstake_from_voting",
            Self::UnstakeFromProposing { .. } => "unstake_from_proposing",
            Self::CreateProposal { .. } => "create_proposal",
            Self::CreateTreasuryProposal { .. } => "create_treasury_proposal",
            Self::Vote { .. } => "vote",
            Self::Finalize { .. } => "finalize",
            Self::Execute { .. } => "execute",
            Self::FundTreasury { .. } => "fund_treasury",
            Self::BuyTokens { .. } => "buy_tokens",
            Self::MintTokens { .. } => "mint_tokens",
            Self::SetPanicWallet { .. } => "set_panic_wallet",
            Self::Panic => "panic",
            Self::Calm => "calm",
            Self::SetParameters { .. } => "set_parameters",
            Self::SetQuorum { .. } => "set_quorum",
            Self::TransferOwnership { .. } => "transfer_ownership",
        }
    }
}

/// One line of replay output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayLine {
    Event {
        step: usize,
        record: EventRecord,
    },
    Rejected {
        step: usize,
        at: Timestamp,
        op: &'static str,
        caller: AccountId,
        error: String,
    },
}

/// Result of a replay: the output lines and the engine as the script left it.
#[derive(Debug)]
pub struct Replay {
    pub lines: Vec<ReplayLine>,
    pub dao: GovernanceDao<NullGateway>,
    /// Time of the last step.
    pub finished_at: Timestamp,
}

impl Script {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("invalid script")
    }

    pub fn from_toml_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {path}"))
    }
}

/// Run `script` against a fresh engine built from `config`.
///
/// Rejected operations are reported and the replay continues.
pub fn replay(config: &DaoConfig, script: &Script) -> anyhow::Result<Replay> {
    let mut gateway = NullGateway::new();
    for seed in &script.accounts {
        gateway.give_tokens(&seed.id, seed.tokens);
        gateway.give_value(&seed.id, seed.value);
    }
    let mut dao = GovernanceDao::new(config.to_init(), gateway)?;
    let clock = NullClock::new(0);
    let mut lines = Vec::new();

    for (index, step) in script.steps.iter().enumerate() {
        if step.at < clock.now().as_secs() {
            bail!(
                "step {index} at {}s runs before the previous step at {}",
                step.at,
                clock.now()
            );
        }
        clock.set(step.at);
        let now = clock.now();
        let seen = dao.events().len();
        match apply(&mut dao, step, now) {
            Ok(()) => lines.extend(
                dao.events()[seen..]
                    .iter()
                    .cloned()
                    .map(|record| ReplayLine::Event { step: index, record }),
            ),
            Err(err) => {
                tracing::debug!(step = index, op = step.action.name(), %err, "step rejected");
                lines.push(ReplayLine::Rejected {
                    step: index,
                    at: now,
                    op: step.action.name(),
                    caller: step.caller,
                    error: err.to_string(),
                });
            }
        }
    }
    tracing::info!(
        steps = script.steps.len(),
        events = dao.events().len(),
        "replay finished"
    );
    Ok(Replay {
        lines,
        dao,
        finished_at: clock.now(),
    })
}

fn apply(dao: &mut GovernanceDao<NullGateway>, step: &Step, now: Timestamp) -> Result<(), DaoError> {
    let caller = &step.caller;
    match &step.action {
        Action::StakeForVoting { amount } => dao.stake_for_voting(caller, *amount, now),
        Action::StakeForProposing { amount } => dao.stake_for_proposing(caller, *amount, now),
        Action::UnstakeFromVoting { amount } => dao.unstake_from_voting(caller, *amount, now),
        Action::UnstakeFromProposing { amount } => dao.unstake_from_proposing(caller, *amount, now),
        Action::CreateProposal { title, description } => dao
            .create_proposal(caller, title.as_str(), description.as_str(), now)
            .map(|_| ()),
        Action::CreateTreasuryProposal {
            title,
            description,
            recipient,
            amount,
        } => dao
            .create_treasury_proposal(caller, title.as_str(), description.as_str(), *recipient, *amount, now)
            .map(|_| ()),
        Action::Vote { proposal, support } => dao.vote(caller, *proposal, *support, now).map(|_| ()),
        Action::Finalize { proposal } => dao.finalize_proposal(caller, *proposal, now).map(|_| ()),
        Action::Execute { proposal } => dao
            .execute_treasury_proposal(caller, *proposal, now)
            .map(|_| ()),
        Action::FundTreasury { amount } => dao.fund_treasury(caller, *amount, now),
        Action::BuyTokens { value } => dao.buy_tokens(caller, *value, now).map(|_| ()),
        Action::MintTokens { to, amount } => dao.mint_tokens(caller, *to, *amount, now),
        Action::SetPanicWallet { account } => dao.set_panic_wallet(caller, *account, now),
        Action::Panic => dao.activate_panic(caller, now),
        Action::Calm => dao.activate_calm(caller, now),
        Action::SetParameters { params } => dao.set_parameters(caller, params, now),
        Action::SetQuorum { quorum, approval } => dao.set_quorum(caller, *quorum, *approval, now),
        Action::TransferOwnership { new_owner } => dao.transfer_ownership(caller, *new_owner, now),
    }
}
