//! Proposal registry: proposal bookkeeping from creation to execution.
//!
//! The registry owns proposals and vote records. It reads stake and
//! parameters but never moves assets; treasury payouts are the engine's job.

use crate::error::{GovernanceError, TreasuryDefect};
use crate::proposal::{Proposal, ProposalId, ProposalStatus, TreasuryTransfer};
use crate::tally::{Outcome, Tally};
use agora_stake::{StakeLedger, StakePurpose};
use agora_types::{AccountId, DaoParams, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Append-only proposal store plus the set of (proposal, voter) pairs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalRegistry {
    proposals: Vec<Proposal>,
    votes: BTreeSet<(ProposalId, AccountId)>,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        usize::try_from(id).ok().and_then(|i| self.proposals.get(i))
    }

    fn get_mut(&mut self, id: ProposalId) -> Option<&mut Proposal> {
        usize::try_from(id).ok().and_then(|i| self.proposals.get_mut(i))
    }

    /// Number of proposals ever created. Also the next id.
    pub fn count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    pub fn has_voted(&self, id: ProposalId, voter: &AccountId) -> bool {
        self.votes.contains(&(id, *voter))
    }

    /// Register a proposal from `proposer`, optionally carrying a treasury payout.
    ///
    /// The proposing-stake requirement is checked before the payout fields.
    #[allow(clippy::too_many_arguments)]
    pub fn create_proposal(
        &mut self,
        stakes: &StakeLedger,
        params: &DaoParams,
        proposer: &AccountId,
        title: String,
        description: String,
        treasury: Option<TreasuryTransfer>,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let bond = stakes.amount(proposer, StakePurpose::Proposing);
        if bond < params.min_stake_for_proposing {
            return Err(GovernanceError::InsufficientStake {
                have: bond,
                need: params.min_stake_for_proposing,
            });
        }
        if let Some(transfer) = &treasury {
            if transfer.recipient.is_zero() {
                return Err(GovernanceError::InvalidTreasuryProposal(
                    TreasuryDefect::NullRecipient,
                ));
            }
            if transfer.amount == 0 {
                return Err(GovernanceError::InvalidTreasuryProposal(
                    TreasuryDefect::ZeroAmount,
                ));
            }
        }

        let id = self.count();
        self.proposals.push(Proposal {
            id,
            proposer: *proposer,
            title,
            description,
            created_at: now,
            ends_at: now.plus(params.proposal_voting_duration_secs),
            for_votes: 0,
            against_votes: 0,
            status: ProposalStatus::Active,
            executed: false,
            treasury,
        });
        tracing::debug!(proposal = id, %proposer, treasury = treasury.is_some(), "proposal registered");
        Ok(id)
    }

    /// Record a vote and return the voting power it carried.
    ///
    /// Power is read from the ledger at the moment of voting; later stake
    /// changes do not touch votes already cast.
    pub fn cast_vote(
        &mut self,
        stakes: &StakeLedger,
        params: &DaoParams,
        id: ProposalId,
        voter: &AccountId,
        support: bool,
        now: Timestamp,
    ) -> Result<u128, GovernanceError> {
        let proposal = self.get(id).ok_or(GovernanceError::InvalidProposal(id))?;
        if !proposal.is_open(now) {
            return Err(GovernanceError::VotingNotAllowed(id));
        }
        if self.has_voted(id, voter) {
            return Err(GovernanceError::AlreadyVoted {
                proposal: id,
                voter: *voter,
            });
        }
        let stake = stakes.amount(voter, StakePurpose::Voting);
        let power = stakes.voting_power(voter, params.tokens_per_vote_power);
        if power == 0 || stake < params.min_stake_for_voting {
            return Err(GovernanceError::InsufficientStake {
                have: stake,
                need: params.min_stake_for_voting,
            });
        }

        let (for_votes, against_votes) = if support {
            (
                proposal
                    .for_votes
                    .checked_add(power)
                    .ok_or(GovernanceError::Overflow)?,
                proposal.against_votes,
            )
        } else {
            (
                proposal.for_votes,
                proposal
                    .against_votes
                    .checked_add(power)
                    .ok_or(GovernanceError::Overflow)?,
            )
        };

        let proposal = self.get_mut(id).ok_or(GovernanceError::InvalidProposal(id))?;
        proposal.for_votes = for_votes;
        proposal.against_votes = against_votes;
        self.votes.insert((id, *voter));
        Ok(power)
    }

    /// Close voting and decide the proposal.
    ///
    /// A missed quorum leaves the proposal Active so it can be finalized
    /// again once more voting power has been withdrawn from the total.
    pub fn finalize(
        &mut self,
        stakes: &StakeLedger,
        params: &DaoParams,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<ProposalStatus, GovernanceError> {
        let proposal = self.get(id).ok_or(GovernanceError::InvalidProposal(id))?;
        if proposal.status != ProposalStatus::Active || now < proposal.ends_at {
            return Err(GovernanceError::VotingNotAllowed(id));
        }
        let registered = stakes.total_voting_power(params.tokens_per_vote_power);
        let outcome = Tally::new(proposal.for_votes, proposal.against_votes).decide(
            registered,
            params.quorum_percentage,
            params.approval_percentage,
        )?;
        let status = match outcome {
            Outcome::QuorumNotReached { have, need } => {
                return Err(GovernanceError::QuorumNotReached { have, need })
            }
            Outcome::Accepted => ProposalStatus::Accepted,
            Outcome::Rejected => ProposalStatus::Rejected,
        };

        let proposal = self.get_mut(id).ok_or(GovernanceError::InvalidProposal(id))?;
        proposal.status = status;
        Ok(status)
    }

    /// The payout an accepted, unexecuted treasury proposal carries.
    ///
    /// Does not check the treasury balance; the caller holds it.
    pub fn executable(&self, id: ProposalId) -> Result<TreasuryTransfer, GovernanceError> {
        let proposal = self.get(id).ok_or(GovernanceError::InvalidTreasuryProposal(
            TreasuryDefect::UnknownProposal(id),
        ))?;
        let transfer = proposal
            .treasury
            .ok_or(GovernanceError::InvalidTreasuryProposal(
                TreasuryDefect::NotTreasury(id),
            ))?;
        if proposal.status != ProposalStatus::Accepted || proposal.executed {
            return Err(GovernanceError::ProposalNotExecutable(id));
        }
        Ok(transfer)
    }

    /// Flag a treasury proposal as paid out.
    pub fn mark_executed(&mut self, id: ProposalId) -> Result<TreasuryTransfer, GovernanceError> {
        let transfer = self.executable(id)?;
        if let Some(proposal) = self.get_mut(id) {
            proposal.executed = true;
        }
        Ok(transfer)
    }

    /// Undo [`mark_executed`](Self::mark_executed) after a failed payout.
    pub fn revert_execution(&mut self, id: ProposalId) {
        if let Some(proposal) = self.get_mut(id) {
            proposal.executed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::tokens;

    fn acct(n: u64) -> AccountId {
        AccountId::from_low_u64(n)
    }

    fn params() -> DaoParams {
        DaoParams {
            min_stake_for_voting: tokens(10),
            min_stake_for_proposing: tokens(50),
            tokens_per_vote_power: tokens(1),
            proposal_voting_duration_secs: 100,
            ..DaoParams::defaults()
        }
    }

    fn setup() -> (ProposalRegistry, StakeLedger, DaoParams) {
        let mut stakes = StakeLedger::new();
        let t0 = Timestamp::new(0);
        stakes.stake(&acct(1), StakePurpose::Proposing, tokens(50), t0).unwrap();
        stakes.stake(&acct(1), StakePurpose::Voting, tokens(60), t0).unwrap();
        stakes.stake(&acct(2), StakePurpose::Voting, tokens(40), t0).unwrap();
        (ProposalRegistry::new(), stakes, params())
    }

    fn propose(reg: &mut ProposalRegistry, stakes: &StakeLedger, params: &DaoParams) -> ProposalId {
        reg.create_proposal(
            stakes,
            params,
            &acct(1),
            "Upgrade".into(),
            "Move to v2".into(),
            None,
            Timestamp::new(1_000),
        )
        .unwrap()
    }

    #[test]
    fn ids_are_dense_and_window_is_set() {
        let (mut reg, stakes, params) = setup();
        assert_eq!(propose(&mut reg, &stakes, &params), 0);
        assert_eq!(propose(&mut reg, &stakes, &params), 1);
        let p = reg.get(1).unwrap();
        assert_eq!(p.created_at, Timestamp::new(1_000));
        assert_eq!(p.ends_at, Timestamp::new(1_100));
        assert_eq!(p.status, ProposalStatus::Active);
        assert_eq!(reg.count(), 2);
    }

    #[test]
    fn proposing_requires_bond() {
        let (mut reg, stakes, params) = setup();
        let err = reg
            .create_proposal(&stakes, &params, &acct(2), "t".into(), "d".into(), None, Timestamp::new(0))
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::InsufficientStake {
                have: 0,
                need: tokens(50)
            }
        );
        assert_eq!(reg.count(), 0);
    }

    #[test]
    fn treasury_payload_is_validated() {
        let (mut reg, stakes, params) = setup();
        let null = TreasuryTransfer {
            recipient: AccountId::ZERO,
            amount: 5,
        };
        let zero = TreasuryTransfer {
            recipient: acct(9),
            amount: 0,
        };
        for (transfer, defect) in [
            (null, TreasuryDefect::NullRecipient),
            (zero, TreasuryDefect::ZeroAmount),
        ] {
            let err = reg
                .create_proposal(&stakes, &params, &acct(1), "t".into(), "d".into(), Some(transfer), Timestamp::new(0))
                .unwrap_err();
            assert_eq!(err, GovernanceError::InvalidTreasuryProposal(defect));
        }
        assert_eq!(reg.count(), 0);
    }

    #[test]
    fn one_vote_per_account() {
        let (mut reg, stakes, params) = setup();
        let id = propose(&mut reg, &stakes, &params);
        let power = reg
            .cast_vote(&stakes, &params, id, &acct(2), false, Timestamp::new(1_050))
            .unwrap();
        assert_eq!(power, 40);
        let err = reg
            .cast_vote(&stakes, &params, id, &acct(2), true, Timestamp::new(1_060))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::AlreadyVoted { .. }));
        let p = reg.get(id).unwrap();
        assert_eq!((p.for_votes, p.against_votes), (0, 40));
        assert!(reg.has_voted(id, &acct(2)));
    }

    #[test]
    fn voting_closes_at_end() {
        let (mut reg, stakes, params) = setup();
        let id = propose(&mut reg, &stakes, &params);
        let err = reg
            .cast_vote(&stakes, &params, id, &acct(1), true, Timestamp::new(1_100))
            .unwrap_err();
        assert_eq!(err, GovernanceError::VotingNotAllowed(id));
        assert_eq!(
            reg.cast_vote(&stakes, &params, 7, &acct(1), true, Timestamp::new(1_000)),
            Err(GovernanceError::InvalidProposal(7))
        );
    }

    #[test]
    fn voter_without_stake_is_rejected() {
        let (mut reg, stakes, params) = setup();
        let id = propose(&mut reg, &stakes, &params);
        let err = reg
            .cast_vote(&stakes, &params, id, &acct(3), true, Timestamp::new(1_001))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InsufficientStake { have: 0, .. }));
        assert!(!reg.has_voted(id, &acct(3)));
    }

    #[test]
    fn finalize_before_end_and_twice() {
        let (mut reg, stakes, params) = setup();
        let id = propose(&mut reg, &stakes, &params);
        reg.cast_vote(&stakes, &params, id, &acct(1), true, Timestamp::new(1_001)).unwrap();
        assert_eq!(
            reg.finalize(&stakes, &params, id, Timestamp::new(1_099)),
            Err(GovernanceError::VotingNotAllowed(id))
        );
        assert_eq!(
            reg.finalize(&stakes, &params, id, Timestamp::new(1_100)),
            Ok(ProposalStatus::Accepted)
        );
        assert_eq!(
            reg.finalize(&stakes, &params, id, Timestamp::new(1_200)),
            Err(GovernanceError::VotingNotAllowed(id))
        );
    }

    #[test]
    fn quorum_failure_leaves_proposal_active() {
        let (mut reg, mut stakes, params) = setup();
        stakes.stake(&acct(5), StakePurpose::Voting, tokens(500), Timestamp::new(0)).unwrap();
        let id = propose(&mut reg, &stakes, &params);
        reg.cast_vote(&stakes, &params, id, &acct(2), true, Timestamp::new(1_001)).unwrap();
        // 600 registered, 30% => 180 needed, 40 cast
        assert_eq!(
            reg.finalize(&stakes, &params, id, Timestamp::new(1_100)),
            Err(GovernanceError::QuorumNotReached { have: 40, need: 180 })
        );
        assert_eq!(reg.get(id).unwrap().status, ProposalStatus::Active);
    }

    #[test]
    fn execution_bookkeeping() {
        let (mut reg, stakes, params) = setup();
        let transfer = TreasuryTransfer {
            recipient: acct(9),
            amount: 1_000,
        };
        let plain = propose(&mut reg, &stakes, &params);
        let id = reg
            .create_proposal(&stakes, &params, &acct(1), "Grant".into(), "".into(), Some(transfer), Timestamp::new(1_000))
            .unwrap();

        assert_eq!(
            reg.executable(plain),
            Err(GovernanceError::InvalidTreasuryProposal(TreasuryDefect::NotTreasury(plain)))
        );
        assert_eq!(
            reg.executable(42),
            Err(GovernanceError::InvalidTreasuryProposal(TreasuryDefect::UnknownProposal(42)))
        );
        assert_eq!(reg.executable(id), Err(GovernanceError::ProposalNotExecutable(id)));

        reg.cast_vote(&stakes, &params, id, &acct(1), true, Timestamp::new(1_001)).unwrap();
        reg.finalize(&stakes, &params, id, Timestamp::new(1_100)).unwrap();
        assert_eq!(reg.mark_executed(id), Ok(transfer));
        assert_eq!(reg.mark_executed(id), Err(GovernanceError::ProposalNotExecutable(id)));

        reg.revert_execution(id);
        assert_eq!(reg.executable(id), Ok(transfer));
    }
}
