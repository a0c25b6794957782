//! Custodied balances: the base-currency treasury and the unsold token reserve.
//!
//! Staked tokens are custodied too but are accounted for by the stake
//! ledger; the reserve only counts tokens available for sale.

use crate::error::DaoError;
use agora_types::amount::decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasury {
    #[serde(with = "decimal")]
    balance: u128,
    #[serde(with = "decimal")]
    token_reserve: u128,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base-currency value held for payouts.
    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Tokens held for sale.
    pub fn token_reserve(&self) -> u128 {
        self.token_reserve
    }

    pub fn deposit(&mut self, amount: u128) -> Result<(), DaoError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(DaoError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Take `amount` out of the treasury; the caller already checked it is held.
    pub fn withdraw(&mut self, amount: u128) -> Result<(), DaoError> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(DaoError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn add_reserve(&mut self, amount: u128) -> Result<(), DaoError> {
        self.token_reserve = self
            .token_reserve
            .checked_add(amount)
            .ok_or(DaoError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn take_reserve(&mut self, amount: u128) -> Result<(), DaoError> {
        self.token_reserve = self
            .token_reserve
            .checked_sub(amount)
            .ok_or(DaoError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Book a token sale: `tokens` leave the reserve, `value` joins the
    /// treasury. Both sides are checked before either is written.
    pub fn record_sale(&mut self, value: u128, tokens: u128) -> Result<(), DaoError> {
        let balance = self
            .balance
            .checked_add(value)
            .ok_or(DaoError::ArithmeticOverflow)?;
        let reserve = self
            .token_reserve
            .checked_sub(tokens)
            .ok_or(DaoError::ArithmeticOverflow)?;
        self.balance = balance;
        self.token_reserve = reserve;
        Ok(())
    }

    /// Undo a [`record_sale`](Self::record_sale) whose transfers failed.
    pub fn reverse_sale(&mut self, value: u128, tokens: u128) {
        self.balance = self.balance.saturating_sub(value);
        self.token_reserve = self.token_reserve.saturating_add(tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balances_never_wrap() {
        let mut t = Treasury::new();
        t.deposit(10).unwrap();
        assert_eq!(t.withdraw(11), Err(DaoError::ArithmeticOverflow));
        assert_eq!(t.balance(), 10);
        t.deposit(u128::MAX - 10).unwrap();
        assert_eq!(t.deposit(1), Err(DaoError::ArithmeticOverflow));

        t.add_reserve(3).unwrap();
        assert!(t.take_reserve(4).is_err());
        t.take_reserve(3).unwrap();
        assert_eq!(t.token_reserve(), 0);
    }

    #[test]
    fn sale_is_all_or_nothing() {
        let mut t = Treasury::new();
        t.add_reserve(100).unwrap();
        assert!(t.record_sale(5, 101).is_err());
        assert_eq!((t.balance(), t.token_reserve()), (0, 100));

        t.record_sale(5, 40).unwrap();
        assert_eq!((t.balance(), t.token_reserve()), (5, 60));
        t.reverse_sale(5, 40);
        assert_eq!((t.balance(), t.token_reserve()), (0, 100));
    }
}
