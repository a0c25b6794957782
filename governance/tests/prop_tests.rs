use proptest::prelude::*;

use agora_governance::tally::required_quorum;
use agora_governance::{GovernanceError, Outcome, ProposalRegistry, ProposalStatus, Tally};
use agora_stake::{StakeLedger, StakePurpose};
use agora_types::{tokens, AccountId, DaoParams, Timestamp};

proptest! {
    /// Required quorum never exceeds registered power and matches the
    /// straightforward formula wherever that formula cannot overflow.
    #[test]
    fn required_quorum_matches_naive(q in 1u32..=100, registered in 0u128..(u128::MAX / 100)) {
        let need = required_quorum(q, registered);
        prop_assert!(need <= registered);
        prop_assert_eq!(need, u128::from(q) * registered / 100);
    }

    /// A decided outcome is Accepted exactly when the floored approval ratio
    /// reaches the threshold.
    #[test]
    fn acceptance_follows_approval_ratio(
        for_votes in 0u128..1_000_000,
        against_votes in 0u128..1_000_000,
        approval in 1u32..=100,
    ) {
        let tally = Tally::new(for_votes, against_votes);
        // zero registered power means zero quorum, so a decision is always reached
        let outcome = tally.decide(0, 30, approval).unwrap();
        let total = for_votes + against_votes;
        let accepted = total > 0 && for_votes * 100 / total >= u128::from(approval);
        prop_assert_eq!(outcome == Outcome::Accepted, accepted);
        let undecided = matches!(outcome, Outcome::QuorumNotReached { .. });
        prop_assert!(!undecided);
    }

    /// Whatever order accounts try to vote in, each lands at most once and
    /// the tally equals the power of the distinct voters.
    #[test]
    fn tally_counts_each_voter_once(
        voters in prop::collection::vec((0u64..6, any::<bool>()), 1..30),
    ) {
        let params = DaoParams {
            min_stake_for_voting: tokens(1),
            min_stake_for_proposing: tokens(1),
            tokens_per_vote_power: tokens(1),
            ..DaoParams::defaults()
        };
        let mut stakes = StakeLedger::new();
        let t0 = Timestamp::new(0);
        for n in 0..6u64 {
            stakes.stake(&AccountId::from_low_u64(n), StakePurpose::Voting, tokens(n + 1), t0).unwrap();
        }
        stakes.stake(&AccountId::from_low_u64(0), StakePurpose::Proposing, tokens(1), t0).unwrap();

        let mut reg = ProposalRegistry::new();
        let id = reg
            .create_proposal(&stakes, &params, &AccountId::from_low_u64(0), "p".into(), "d".into(), None, t0)
            .unwrap();

        let mut seen = std::collections::BTreeMap::new();
        for (who, support) in voters {
            let account = AccountId::from_low_u64(who);
            match reg.cast_vote(&stakes, &params, id, &account, support, Timestamp::new(1)) {
                Ok(power) => {
                    prop_assert!(seen.insert(who, (power, support)).is_none());
                }
                Err(GovernanceError::AlreadyVoted { .. }) => prop_assert!(seen.contains_key(&who)),
                Err(e) => return Err(TestCaseError::fail(format!("unexpected {e}"))),
            }
        }

        let expected_for: u128 = seen.values().filter(|(_, s)| *s).map(|(p, _)| p).sum();
        let expected_against: u128 = seen.values().filter(|(_, s)| !*s).map(|(p, _)| p).sum();
        let p = reg.get(id).unwrap();
        prop_assert_eq!(p.for_votes, expected_for);
        prop_assert_eq!(p.against_votes, expected_against);
        prop_assert_eq!(p.status, ProposalStatus::Active);
    }
}
