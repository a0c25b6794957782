//! The stake ledger: balances, lock timers and the registered voting total.

use crate::error::StakeError;
use crate::stake::{StakePurpose, StakeRecord};
use agora_types::{amount::decimal, AccountId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-account, per-purpose stake balances.
///
/// `total_voting_stake` is a running counter updated in the same step as
/// every voting-purpose balance change, never recomputed by scanning. It is
/// the denominator for quorum.
///
/// Records are created lazily on first stake and never removed; a fully
/// withdrawn record stays at zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StakeLedger {
    voting: BTreeMap<AccountId, StakeRecord>,
    proposing: BTreeMap<AccountId, StakeRecord>,
    #[serde(with = "decimal")]
    total_voting_stake: u128,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn book(&self, purpose: StakePurpose) -> &BTreeMap<AccountId, StakeRecord> {
        match purpose {
            StakePurpose::Voting => &self.voting,
            StakePurpose::Proposing => &self.proposing,
        }
    }

    fn book_mut(&mut self, purpose: StakePurpose) -> &mut BTreeMap<AccountId, StakeRecord> {
        match purpose {
            StakePurpose::Voting => &mut self.voting,
            StakePurpose::Proposing => &mut self.proposing,
        }
    }

    /// The account's record for `purpose`; a zero record if it never staked.
    pub fn record(&self, account: &AccountId, purpose: StakePurpose) -> StakeRecord {
        self.book(purpose).get(account).copied().unwrap_or_default()
    }

    /// Amount currently staked by `account` for `purpose`.
    pub fn amount(&self, account: &AccountId, purpose: StakePurpose) -> u128 {
        self.record(account, purpose).amount
    }

    /// Sum of all voting-purpose stake.
    pub fn total_voting_stake(&self) -> u128 {
        self.total_voting_stake
    }

    /// Sum of all proposing-purpose stake. Scans; only used for reporting.
    pub fn total_proposing_stake(&self) -> u128 {
        self.proposing
            .values()
            .fold(0u128, |acc, r| acc.saturating_add(r.amount))
    }

    /// Voting power of `account`: `floor(voting stake / tokens_per_vote_power)`.
    ///
    /// Zero is a legitimate result when the stake is below one conversion unit.
    pub fn voting_power(&self, account: &AccountId, tokens_per_vote_power: u128) -> u128 {
        self.amount(account, StakePurpose::Voting)
            .checked_div(tokens_per_vote_power)
            .unwrap_or(0)
    }

    /// Registered voting power: `floor(total_voting_stake / tokens_per_vote_power)`.
    ///
    /// Computed from the aggregate, not by summing per-account power, so it
    /// can exceed that sum by the accumulated remainders.
    pub fn total_voting_power(&self, tokens_per_vote_power: u128) -> u128 {
        self.total_voting_stake
            .checked_div(tokens_per_vote_power)
            .unwrap_or(0)
    }

    /// Every account holding a record for `purpose`, in address order.
    pub fn iter(&self, purpose: StakePurpose) -> impl Iterator<Item = (&AccountId, &StakeRecord)> {
        self.book(purpose).iter()
    }

    /// Lock `amount` more tokens for `purpose` and restart the lock window.
    ///
    /// All arithmetic is checked before anything is written, so an overflow
    /// leaves the ledger untouched.
    pub fn stake(
        &mut self,
        account: &AccountId,
        purpose: StakePurpose,
        amount: u128,
        now: Timestamp,
    ) -> Result<StakeRecord, StakeError> {
        if amount == 0 {
            return Err(StakeError::ZeroAmount);
        }
        let current = self.record(account, purpose);
        let new_amount = current
            .amount
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        let new_total = match purpose {
            StakePurpose::Voting => self
                .total_voting_stake
                .checked_add(amount)
                .ok_or(StakeError::Overflow)?,
            StakePurpose::Proposing => self.total_voting_stake,
        };

        let updated = StakeRecord {
            amount: new_amount,
            locked_since: now,
        };
        self.book_mut(purpose).insert(*account, updated);
        self.total_voting_stake = new_total;
        tracing::trace!(%account, %purpose, amount, total = new_amount, "stake recorded");
        Ok(updated)
    }

    /// Check whether `amount` could be withdrawn at `now` without changing anything.
    pub fn check_unstake(
        &self,
        account: &AccountId,
        purpose: StakePurpose,
        amount: u128,
        now: Timestamp,
        lock_secs: u64,
    ) -> Result<StakeRecord, StakeError> {
        let current = self.record(account, purpose);
        if amount == 0 || amount > current.amount {
            return Err(StakeError::InsufficientStake {
                requested: amount,
                available: current.amount,
            });
        }
        if current.is_locked(now, lock_secs) {
            return Err(StakeError::LockTimeNotReached {
                unlocks_at: current.locked_until(lock_secs),
            });
        }
        Ok(current)
    }

    /// Withdraw `amount` from the account's `purpose` stake.
    ///
    /// Returns the record as it was before the withdrawal so the caller can
    /// [`reinstate`](Self::reinstate) it if the token transfer back fails.
    /// The lock start is left unchanged by a withdrawal.
    pub fn unstake(
        &mut self,
        account: &AccountId,
        purpose: StakePurpose,
        amount: u128,
        now: Timestamp,
        lock_secs: u64,
    ) -> Result<StakeRecord, StakeError> {
        let previous = self.check_unstake(account, purpose, amount, now, lock_secs)?;
        // check_unstake guarantees amount <= previous.amount <= total for voting
        let remaining = previous.amount - amount;
        if purpose == StakePurpose::Voting {
            self.total_voting_stake = self
                .total_voting_stake
                .checked_sub(amount)
                .ok_or(StakeError::Overflow)?;
        }
        self.book_mut(purpose).insert(
            *account,
            StakeRecord {
                amount: remaining,
                locked_since: previous.locked_since,
            },
        );
        tracing::trace!(%account, %purpose, amount, remaining, "stake withdrawn");
        Ok(previous)
    }

    /// Put a record back to an earlier value, adjusting the voting total by
    /// the difference. Used to roll back a withdrawal whose payout failed.
    pub fn reinstate(&mut self, account: &AccountId, purpose: StakePurpose, previous: StakeRecord) {
        let current = self.record(account, purpose);
        if purpose == StakePurpose::Voting {
            self.total_voting_stake = self
                .total_voting_stake
                .saturating_sub(current.amount)
                .saturating_add(previous.amount);
        }
        self.book_mut(purpose).insert(*account, previous);
    }

    /// Recompute the voting total by scanning every record.
    ///
    /// Diagnostic only: the engine never uses this for decisions.
    pub fn audit_voting_total(&self) -> u128 {
        self.voting
            .values()
            .fold(0u128, |acc, r| acc.saturating_add(r.amount))
    }
}
