use proptest::prelude::*;

use agora_types::{mul_div, validate_percentages, AccountId, DaoParams, ParamError, Timestamp};

proptest! {
    /// Scaling numerator and denominator by 2^64 pushes the product past
    /// u128 without changing the quotient.
    #[test]
    fn mul_div_matches_narrow_arithmetic(
        a in 0u128..(1 << 63),
        b in 0u128..(1 << 63),
        d in 1u128..(1 << 63),
    ) {
        prop_assert_eq!(mul_div(a, b, d), Some(a * b / d));
        prop_assert_eq!(mul_div(a << 64, b, d << 64), Some(a * b / d));
    }

    /// AccountId::is_zero is true only for all-zero bytes.
    #[test]
    fn account_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        let id = AccountId::new(bytes);
        prop_assert_eq!(id.is_zero(), bytes == [0u8; 20]);
    }

    /// Any 20-byte address parses back from its rendered form.
    #[test]
    fn account_display_parses(bytes in prop::array::uniform20(0u8..)) {
        let id = AccountId::new(bytes);
        prop_assert_eq!(id.to_string().parse::<AccountId>().unwrap(), id);
    }

    /// Percentages validate exactly when both lie in [1, 100].
    #[test]
    fn percentage_bounds(quorum in 0u32..200, approval in 0u32..200) {
        let ok = (1..=100).contains(&quorum) && (1..=100).contains(&approval);
        prop_assert_eq!(validate_percentages(quorum, approval).is_ok(), ok);
    }

    /// Strictly positive amounts and durations with in-range percentages always validate.
    #[test]
    fn positive_params_validate(
        price in 1u128..u128::MAX,
        min_vote in 1u128..u128::MAX,
        min_prop in 1u128..u128::MAX,
        per_power in 1u128..u128::MAX,
        lock in 1u64..u64::MAX,
        duration in 1u64..u64::MAX,
        quorum in 1u32..=100,
        approval in 1u32..=100,
    ) {
        let params = DaoParams {
            token_unit_price: price,
            min_stake_for_voting: min_vote,
            min_stake_for_proposing: min_prop,
            tokens_per_vote_power: per_power,
            stake_lock_duration_secs: lock,
            proposal_voting_duration_secs: duration,
            quorum_percentage: quorum,
            approval_percentage: approval,
        };
        prop_assert!(params.validate().is_ok());
    }

    /// A zero lock duration is always rejected, whatever the other fields hold.
    #[test]
    fn zero_lock_rejected(quorum in 1u32..=100, approval in 1u32..=100) {
        let params = DaoParams {
            stake_lock_duration_secs: 0,
            quorum_percentage: quorum,
            approval_percentage: approval,
            ..DaoParams::defaults()
        };
        prop_assert_eq!(params.validate(), Err(ParamError::Zero("stake_lock_duration_secs")));
    }

    /// A lock expires exactly when `now >= start + duration`.
    #[test]
    fn lock_expiry_boundary(start in 0u64..1_000_000, duration in 1u64..1_000_000, now in 0u64..3_000_000) {
        let expired = Timestamp::new(start).has_expired(duration, Timestamp::new(now));
        prop_assert_eq!(expired, now >= start + duration);
    }
}
