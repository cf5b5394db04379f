//! Account Query Use Case
//!
//! Profile, other users' pages and the user list for an authenticated
//! viewer.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountListing, AccountRepository};
use crate::domain::value_object::{account_id::AccountId, public_id::PublicId};
use crate::error::{AuthError, AuthResult};

pub struct AccountQueryUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
}

impl<A> AccountQueryUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    pub async fn profile(&self, viewer: &AccountId) -> AuthResult<Account> {
        self.account_repo
            .find_by_id(viewer)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    /// Another account's page
    ///
    /// Inactive accounts are hidden from everyone but active administrators.
    pub async fn view(&self, viewer: &AccountId, target: &PublicId) -> AuthResult<Account> {
        let account = self
            .account_repo
            .find_by_public_id(target)
            .await?
            .ok_or(AuthError::AccountNotFound)?;
        if account.can_login() || self.is_admin(viewer).await? {
            return Ok(account);
        }
        Err(AuthError::AccountNotFound)
    }

    /// Active administrators see every account, others only active ones
    pub async fn list(&self, viewer: &AccountId) -> AuthResult<Vec<Account>> {
        let listing = if self.is_admin(viewer).await? {
            AccountListing::All
        } else {
            AccountListing::ActiveOnly
        };
        self.account_repo.list(listing).await
    }

    async fn is_admin(&self, viewer: &AccountId) -> AuthResult<bool> {
        Ok(self
            .account_repo
            .find_by_id(viewer)
            .await?
            .is_some_and(|a| a.is_active_admin()))
    }
}
