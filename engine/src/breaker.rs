//! Emergency pause switch.
//!
//! The panic account may pause and resume the engine. Until a panic account
//! is configured the engine refuses every gated operation.

use crate::error::DaoError;
use agora_types::AccountId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreaker {
    paused: bool,
    panic_account: Option<AccountId>,
}

impl CircuitBreaker {
    pub fn new(panic_account: Option<AccountId>) -> Self {
        Self {
            paused: false,
            panic_account: panic_account.filter(|a| !a.is_zero()),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn panic_account(&self) -> Option<AccountId> {
        self.panic_account
    }

    /// Precondition for every gated operation.
    pub fn ensure_operational(&self) -> Result<(), DaoError> {
        if self.panic_account.is_none() {
            return Err(DaoError::PanicWalletNotSet);
        }
        if self.paused {
            return Err(DaoError::DaoIsPaused);
        }
        Ok(())
    }

    /// Replace the panic account. The caller has already been authorized.
    pub fn set_panic_account(&mut self, account: AccountId) -> Result<(), DaoError> {
        if account.is_zero() {
            return Err(DaoError::InvalidParameter("panic wallet is the null account".into()));
        }
        self.panic_account = Some(account);
        Ok(())
    }

    fn ensure_panic_account(&self, caller: &AccountId) -> Result<(), DaoError> {
        match self.panic_account {
            Some(account) if account == *caller => Ok(()),
            _ => Err(DaoError::NotPanicWallet(*caller)),
        }
    }

    /// Pause. Pausing an already paused engine is allowed.
    pub fn trip(&mut self, caller: &AccountId) -> Result<(), DaoError> {
        self.ensure_panic_account(caller)?;
        self.paused = true;
        Ok(())
    }

    /// Resume. Resuming a running engine is allowed.
    pub fn reset(&mut self, caller: &AccountId) -> Result<(), DaoError> {
        self.ensure_panic_account(caller)?;
        self.paused = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_panic_account_blocks_everything() {
        let breaker = CircuitBreaker::new(None);
        assert_eq!(breaker.ensure_operational(), Err(DaoError::PanicWalletNotSet));
        let zero = CircuitBreaker::new(Some(AccountId::ZERO));
        assert_eq!(zero.panic_account(), None);
    }

    #[test]
    fn only_panic_account_toggles() {
        let panic = AccountId::from_low_u64(7);
        let other = AccountId::from_low_u64(8);
        let mut breaker = CircuitBreaker::new(Some(panic));
        assert_eq!(breaker.ensure_operational(), Ok(()));

        assert_eq!(breaker.trip(&other), Err(DaoError::NotPanicWallet(other)));
        breaker.trip(&panic).unwrap();
        assert_eq!(breaker.ensure_operational(), Err(DaoError::DaoIsPaused));
        assert_eq!(breaker.reset(&other), Err(DaoError::NotPanicWallet(other)));
        breaker.reset(&panic).unwrap();
        assert!(!breaker.is_paused());
    }

    #[test]
    fn null_panic_account_rejected() {
        let mut breaker = CircuitBreaker::new(None);
        assert!(matches!(
            breaker.set_panic_account(AccountId::ZERO),
            Err(DaoError::InvalidParameter(_))
        ));
        assert_eq!(breaker.panic_account(), None);
    }
}
