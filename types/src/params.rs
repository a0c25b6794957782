//! Governance parameters: the economic and timing configuration every
//! component of the engine reads.
//!
//! The administrator replaces these values wholesale; validation happens
//! before any replacement so a rejected update leaves the old values intact.

use crate::amount::{decimal, tokens, TOKEN_UNIT};
use crate::error::ParamError;
use serde::{Deserialize, Serialize};

/// All governance parameters held by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoParams {
    // ── Economics ───────────────────────────────────────────────────────
    /// Price of one whole token in raw base-currency units.
    #[serde(with = "decimal")]
    pub token_unit_price: u128,

    /// Voting-purpose stake (raw) an account needs before it may vote.
    #[serde(with = "decimal")]
    pub min_stake_for_voting: u128,

    /// Proposing-purpose stake (raw) an account needs before it may propose.
    #[serde(with = "decimal")]
    pub min_stake_for_proposing: u128,

    /// Raw tokens that make up one unit of voting power.
    #[serde(with = "decimal")]
    pub tokens_per_vote_power: u128,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Seconds a stake stays locked after its most recent increase.
    pub stake_lock_duration_secs: u64,

    /// Seconds a proposal accepts votes after creation.
    pub proposal_voting_duration_secs: u64,

    // ── Decision thresholds ─────────────────────────────────────────────
    /// Share of registered voting power that must participate, in percent.
    pub quorum_percentage: u32,

    /// Share of participating power that must vote in favour, in percent.
    pub approval_percentage: u32,
}

impl DaoParams {
    /// The configuration the reference deployment ships with.
    pub fn defaults() -> Self {
        Self {
            token_unit_price: TOKEN_UNIT / 1_000, // 0.001 base unit per token
            min_stake_for_voting: tokens(100),
            min_stake_for_proposing: tokens(500),
            tokens_per_vote_power: tokens(10),
            stake_lock_duration_secs: 24 * 3600,          // 1 day
            proposal_voting_duration_secs: 7 * 24 * 3600, // 1 week
            quorum_percentage: 30,
            approval_percentage: 60,
        }
    }

    /// Check every field: amounts and durations strictly positive,
    /// percentages within `[1, 100]`.
    pub fn validate(&self) -> Result<(), ParamError> {
        let amounts = [
            ("token_unit_price", self.token_unit_price),
            ("min_stake_for_voting", self.min_stake_for_voting),
            ("min_stake_for_proposing", self.min_stake_for_proposing),
            ("tokens_per_vote_power", self.tokens_per_vote_power),
        ];
        if let Some((name, _)) = amounts.into_iter().find(|(_, v)| *v == 0) {
            return Err(ParamError::Zero(name));
        }
        if self.stake_lock_duration_secs == 0 {
            return Err(ParamError::Zero("stake_lock_duration_secs"));
        }
        if self.proposal_voting_duration_secs == 0 {
            return Err(ParamError::Zero("proposal_voting_duration_secs"));
        }
        validate_percentages(self.quorum_percentage, self.approval_percentage)
    }

    /// A copy with the economic and timing fields replaced and the
    /// thresholds kept.
    pub fn with_economics(&self, economics: &EconomicParams) -> Self {
        Self {
            token_unit_price: economics.token_unit_price,
            min_stake_for_voting: economics.min_stake_for_voting,
            min_stake_for_proposing: economics.min_stake_for_proposing,
            tokens_per_vote_power: economics.tokens_per_vote_power,
            stake_lock_duration_secs: economics.stake_lock_duration_secs,
            proposal_voting_duration_secs: economics.proposal_voting_duration_secs,
            ..self.clone()
        }
    }
}

/// Default is the reference deployment configuration.
impl Default for DaoParams {
    fn default() -> Self {
        Self::defaults()
    }
}

/// The subset of parameters replaced by a `set_parameters` call.
///
/// Quorum and approval thresholds have their own update path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicParams {
    #[serde(with = "decimal")]
    pub token_unit_price: u128,
    #[serde(with = "decimal")]
    pub min_stake_for_voting: u128,
    #[serde(with = "decimal")]
    pub min_stake_for_proposing: u128,
    pub stake_lock_duration_secs: u64,
    pub proposal_voting_duration_secs: u64,
    #[serde(with = "decimal")]
    pub tokens_per_vote_power: u128,
}

impl From<&DaoParams> for EconomicParams {
    fn from(p: &DaoParams) -> Self {
        Self {
            token_unit_price: p.token_unit_price,
            min_stake_for_voting: p.min_stake_for_voting,
            min_stake_for_proposing: p.min_stake_for_proposing,
            stake_lock_duration_secs: p.stake_lock_duration_secs,
            proposal_voting_duration_secs: p.proposal_voting_duration_secs,
            tokens_per_vote_power: p.tokens_per_vote_power,
        }
    }
}

/// Check a quorum/approval pair.
pub fn validate_percentages(quorum: u32, approval: u32) -> Result<(), ParamError> {
    for (name, value) in [
        ("quorum_percentage", quorum),
        ("approval_percentage", approval),
    ] {
        if !(1..=100).contains(&value) {
            return Err(ParamError::PercentageOutOfRange { name, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(DaoParams::defaults().validate(), Ok(()));
    }

    #[test]
    fn zero_amount_names_the_field() {
        let params = DaoParams {
            tokens_per_vote_power: 0,
            ..DaoParams::defaults()
        };
        assert_eq!(
            params.validate(),
            Err(ParamError::Zero("tokens_per_vote_power"))
        );
    }

    #[test]
    fn zero_durations_rejected() {
        let params = DaoParams {
            proposal_voting_duration_secs: 0,
            ..DaoParams::defaults()
        };
        assert_eq!(
            params.validate(),
            Err(ParamError::Zero("proposal_voting_duration_secs"))
        );
    }

    #[test]
    fn percentages_bounded() {
        assert!(validate_percentages(1, 100).is_ok());
        assert_eq!(
            validate_percentages(0, 60),
            Err(ParamError::PercentageOutOfRange {
                name: "quorum_percentage",
                value: 0
            })
        );
        assert_eq!(
            validate_percentages(30, 101),
            Err(ParamError::PercentageOutOfRange {
                name: "approval_percentage",
                value: 101
            })
        );
    }

    #[test]
    fn with_economics_keeps_thresholds() {
        let base = DaoParams {
            quorum_percentage: 40,
            approval_percentage: 70,
            ..DaoParams::defaults()
        };
        let mut economics = EconomicParams::from(&base);
        economics.stake_lock_duration_secs = 60;
        let updated = base.with_economics(&economics);
        assert_eq!(updated.stake_lock_duration_secs, 60);
        assert_eq!(updated.quorum_percentage, 40);
        assert_eq!(updated.approval_percentage, 70);
    }
}
