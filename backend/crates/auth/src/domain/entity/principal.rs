//! Principal
//!
//! The authenticated subject handed back by the gateway.

use crate::domain::entity::account::Account;
use crate::domain::value_object::{
    account_id::AccountId, public_id::PublicId, user_name::UserName, user_role::UserRole,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: AccountId,
    pub public_id: PublicId,
    pub user_name: UserName,
    pub role: UserRole,
}

impl Principal {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id,
            public_id: account.public_id,
            user_name: account.user_name.clone(),
            role: account.role,
        }
    }
}
