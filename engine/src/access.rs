//! Single-administrator access control.

use crate::error::DaoError;
use agora_types::AccountId;
use serde::{Deserialize, Serialize};

/// The administrator identity and the checks that guard admin-only operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: AccountId,
}

impl AccessControl {
    pub fn new(owner: AccountId) -> Result<Self, DaoError> {
        if owner.is_zero() {
            return Err(DaoError::InvalidParameter("owner is the null account".into()));
        }
        Ok(Self { owner })
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn ensure_owner(&self, caller: &AccountId) -> Result<(), DaoError> {
        if *caller != self.owner {
            return Err(DaoError::UnauthorizedAccount(*caller));
        }
        Ok(())
    }

    /// Hand administration to `new_owner`. Returns the previous owner.
    pub fn transfer(&mut self, caller: &AccountId, new_owner: AccountId) -> Result<AccountId, DaoError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(DaoError::InvalidParameter("new owner is the null account".into()));
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_owner_transfers() {
        let a = AccountId::from_low_u64(1);
        let b = AccountId::from_low_u64(2);
        let mut access = AccessControl::new(a).unwrap();
        assert_eq!(access.transfer(&b, b), Err(DaoError::UnauthorizedAccount(b)));
        assert!(matches!(
            access.transfer(&a, AccountId::ZERO),
            Err(DaoError::InvalidParameter(_))
        ));
        assert_eq!(access.transfer(&a, b), Ok(a));
        assert_eq!(access.owner(), b);
        assert!(access.ensure_owner(&a).is_err());
    }

    #[test]
    fn null_owner_rejected() {
        assert!(AccessControl::new(AccountId::ZERO).is_err());
    }
}
