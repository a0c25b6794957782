//! Nullable asset gateway: an in-memory token and value ledger.

use agora_types::{AccountId, AssetGateway, GatewayError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Which balance a transfer moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Asset {
    Token,
    Value,
}

/// One completed movement. `None` on either side means custody (or, for a
/// mint, nowhere).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub asset: Asset,
    pub from: Option<AccountId>,
    pub to: Option<AccountId>,
    pub amount: u128,
}

/// A test gateway that keeps balances in maps and records every transfer.
///
/// Failures can be injected two ways: [`refuse`](Self::refuse) makes every
/// push to an account fail, and [`fail_after`](Self::fail_after) lets a
/// number of calls through and then fails the next one. A failed call
/// changes nothing.
#[derive(Debug, Default)]
pub struct NullGateway {
    tokens: BTreeMap<AccountId, u128>,
    values: BTreeMap<AccountId, u128>,
    custody_tokens: u128,
    custody_value: u128,
    refused: BTreeSet<AccountId>,
    scheduled_failure: Option<(usize, GatewayError)>,
    transfers: Vec<Transfer>,
}

impl NullGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`give_tokens`](Self::give_tokens).
    pub fn with_tokens(mut self, account: AccountId, amount: u128) -> Self {
        self.give_tokens(&account, amount);
        self
    }

    /// Builder form of [`give_value`](Self::give_value).
    pub fn with_value(mut self, account: AccountId, amount: u128) -> Self {
        self.give_value(&account, amount);
        self
    }

    /// Credit tokens out of thin air (test setup only; not recorded).
    pub fn give_tokens(&mut self, account: &AccountId, amount: u128) {
        let balance = self.tokens.entry(*account).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Credit base-currency value out of thin air (test setup only; not recorded).
    pub fn give_value(&mut self, account: &AccountId, amount: u128) {
        let balance = self.values.entry(*account).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn token_balance(&self, account: &AccountId) -> u128 {
        self.tokens.get(account).copied().unwrap_or(0)
    }

    pub fn value_balance(&self, account: &AccountId) -> u128 {
        self.values.get(account).copied().unwrap_or(0)
    }

    pub fn custody_tokens(&self) -> u128 {
        self.custody_tokens
    }

    pub fn custody_value(&self) -> u128 {
        self.custody_value
    }

    /// Make every push to `account` fail with [`GatewayError::Refused`].
    pub fn refuse(&mut self, account: AccountId) {
        self.refused.insert(account);
    }

    /// Undo [`refuse`](Self::refuse).
    pub fn accept(&mut self, account: &AccountId) {
        self.refused.remove(account);
    }

    /// Fail the next call, whatever it is, with `error`.
    pub fn fail_next(&mut self, error: GatewayError) {
        self.fail_after(0, error);
    }

    /// Let `calls` calls succeed, then fail the one after with `error`.
    pub fn fail_after(&mut self, calls: usize, error: GatewayError) {
        self.scheduled_failure = Some((calls, error));
    }

    /// All completed transfers, oldest first.
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn clear_transfers(&mut self) {
        self.transfers.clear();
    }

    fn injected(&mut self) -> Result<(), GatewayError> {
        match self.scheduled_failure.take() {
            Some((0, err)) => {
                tracing::trace!(%err, "injected gateway failure");
                Err(err)
            }
            Some((remaining, err)) => {
                self.scheduled_failure = Some((remaining - 1, err));
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn ensure_accepted(&self, to: &AccountId) -> Result<(), GatewayError> {
        if self.refused.contains(to) {
            return Err(GatewayError::Refused(*to));
        }
        Ok(())
    }

    fn record(&mut self, asset: Asset, from: Option<AccountId>, to: Option<AccountId>, amount: u128) {
        self.transfers.push(Transfer {
            asset,
            from,
            to,
            amount,
        });
    }
}

fn debit(
    book: &mut BTreeMap<AccountId, u128>,
    account: &AccountId,
    amount: u128,
) -> Result<(), GatewayError> {
    let available = book.get(account).copied().unwrap_or(0);
    if available < amount {
        return Err(GatewayError::InsufficientFunds {
            account: *account,
            needed: amount,
            available,
        });
    }
    book.insert(*account, available - amount);
    Ok(())
}

fn credit(
    book: &mut BTreeMap<AccountId, u128>,
    account: &AccountId,
    amount: u128,
) -> Result<(), GatewayError> {
    let balance = book.get(account).copied().unwrap_or(0);
    let updated = balance.checked_add(amount).ok_or(GatewayError::Overflow)?;
    book.insert(*account, updated);
    Ok(())
}

fn take_custody(held: u128, amount: u128) -> Result<u128, GatewayError> {
    held.checked_sub(amount)
        .ok_or(GatewayError::InsufficientCustody {
            needed: amount,
            available: held,
        })
}

impl AssetGateway for NullGateway {
    fn pull_tokens(&mut self, from: &AccountId, amount: u128) -> Result<(), GatewayError> {
        self.injected()?;
        let custody = self
            .custody_tokens
            .checked_add(amount)
            .ok_or(GatewayError::Overflow)?;
        debit(&mut self.tokens, from, amount)?;
        self.custody_tokens = custody;
        self.record(Asset::Token, Some(*from), None, amount);
        Ok(())
    }

    fn push_tokens(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError> {
        self.injected()?;
        self.ensure_accepted(to)?;
        let custody = take_custody(self.custody_tokens, amount)?;
        credit(&mut self.tokens, to, amount)?;
        self.custody_tokens = custody;
        self.record(Asset::Token, None, Some(*to), amount);
        Ok(())
    }

    fn mint_tokens(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError> {
        self.injected()?;
        self.ensure_accepted(to)?;
        credit(&mut self.tokens, to, amount)?;
        self.record(Asset::Token, None, Some(*to), amount);
        Ok(())
    }

    fn mint_to_custody(&mut self, amount: u128) -> Result<(), GatewayError> {
        self.injected()?;
        self.custody_tokens = self
            .custody_tokens
            .checked_add(amount)
            .ok_or(GatewayError::Overflow)?;
        self.record(Asset::Token, None, None, amount);
        Ok(())
    }

    fn pull_value(&mut self, from: &AccountId, amount: u128) -> Result<(), GatewayError> {
        self.injected()?;
        let custody = self
            .custody_value
            .checked_add(amount)
            .ok_or(GatewayError::Overflow)?;
        debit(&mut self.values, from, amount)?;
        self.custody_value = custody;
        self.record(Asset::Value, Some(*from), None, amount);
        Ok(())
    }

    fn push_value(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError> {
        self.injected()?;
        self.ensure_accepted(to)?;
        let custody = take_custody(self.custody_value, amount)?;
        credit(&mut self.values, to, amount)?;
        self.custody_value = custody;
        self.record(Asset::Value, None, Some(*to), amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(n: u64) -> AccountId {
        AccountId::from_low_u64(n)
    }

    #[test]
    fn pull_and_push_move_balances_through_custody() {
        let mut gw = NullGateway::new().with_tokens(acct(1), 100);
        gw.pull_tokens(&acct(1), 60).unwrap();
        assert_eq!(gw.token_balance(&acct(1)), 40);
        assert_eq!(gw.custody_tokens(), 60);

        gw.push_tokens(&acct(2), 25).unwrap();
        assert_eq!(gw.token_balance(&acct(2)), 25);
        assert_eq!(gw.custody_tokens(), 35);
        assert_eq!(gw.transfers().len(), 2);
    }

    #[test]
    fn insufficient_balance_changes_nothing() {
        let mut gw = NullGateway::new().with_value(acct(1), 5);
        let err = gw.pull_value(&acct(1), 6).unwrap_err();
        assert_eq!(
            err,
            GatewayError::InsufficientFunds {
                account: acct(1),
                needed: 6,
                available: 5
            }
        );
        assert_eq!(gw.value_balance(&acct(1)), 5);
        assert_eq!(gw.custody_value(), 0);
        assert!(gw.transfers().is_empty());

        assert!(matches!(
            gw.push_value(&acct(2), 1),
            Err(GatewayError::InsufficientCustody { .. })
        ));
    }

    #[test]
    fn refused_recipient_and_injected_failure() {
        let mut gw = NullGateway::new().with_value(acct(1), 10);
        gw.pull_value(&acct(1), 10).unwrap();

        gw.refuse(acct(2));
        assert_eq!(gw.push_value(&acct(2), 3), Err(GatewayError::Refused(acct(2))));
        gw.accept(&acct(2));

        gw.fail_next(GatewayError::Other("boom".into()));
        assert!(gw.push_value(&acct(2), 3).is_err());
        gw.push_value(&acct(2), 3).unwrap();
        assert_eq!(gw.value_balance(&acct(2)), 3);
        assert_eq!(gw.custody_value(), 7);

        gw.fail_after(1, GatewayError::Overflow);
        gw.push_value(&acct(2), 1).unwrap();
        assert_eq!(gw.push_value(&acct(2), 1), Err(GatewayError::Overflow));
        gw.push_value(&acct(2), 1).unwrap();
        assert_eq!(gw.value_balance(&acct(2)), 5);
    }

    #[test]
    fn minting() {
        let mut gw = NullGateway::new();
        gw.mint_tokens(&acct(3), 9).unwrap();
        gw.mint_to_custody(4).unwrap();
        assert_eq!(gw.token_balance(&acct(3)), 9);
        assert_eq!(gw.custody_tokens(), 4);
    }
}
