//! Account Administration Use Case
//!
//! Toggle another account's status or administrator role. Rights are read
//! from storage on every call, never from the session.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, AuthSessionRepository};
use crate::domain::value_object::{account_id::AccountId, public_id::PublicId};
use crate::error::{AuthError, AuthResult};

pub const CANNOT_DEACTIVATE_SELF: &str = "You cannot deactivate your own account";
pub const CANNOT_CHANGE_OWN_ADMIN: &str = "You cannot change your own admin status";

pub struct AccountAdminUseCase<A, S>
where
    A: AccountRepository,
    S: AuthSessionRepository,
{
    account_repo: Arc<A>,
    session_repo: Arc<S>,
}

impl<A, S> AccountAdminUseCase<A, S>
where
    A: AccountRepository,
    S: AuthSessionRepository,
{
    pub fn new(account_repo: Arc<A>, session_repo: Arc<S>) -> Self {
        Self {
            account_repo,
            session_repo,
        }
    }

    /// Activate or deactivate `target`; deactivation signs it out everywhere
    pub async fn toggle_active(&self, actor: &AccountId, target: &PublicId) -> AuthResult<Account> {
        let (actor, mut account) = self.load(actor, target).await?;
        if account.account_id == actor.account_id {
            return Err(AuthError::SelfModification(CANNOT_DEACTIVATE_SELF));
        }

        account.toggle_status();
        self.account_repo.update(&account).await?;

        if !account.can_login() {
            let revoked = self
                .session_repo
                .delete_all_for_account(&account.account_id, None)
                .await?;
            tracing::info!(
                public_id = %account.public_id,
                sessions_revoked = revoked,
                "Account deactivated"
            );
        }

        tracing::info!(
            actor_id = %actor.public_id,
            target_id = %account.public_id,
            status = account.status.code(),
            "Account status toggled"
        );
        Ok(account)
    }

    /// Grant or revoke administrator rights on `target`
    pub async fn toggle_admin(&self, actor: &AccountId, target: &PublicId) -> AuthResult<Account> {
        let (actor, mut account) = self.load(actor, target).await?;
        if account.account_id == actor.account_id {
            return Err(AuthError::SelfModification(CANNOT_CHANGE_OWN_ADMIN));
        }

        account.toggle_role();
        self.account_repo.update(&account).await?;

        tracing::info!(
            actor_id = %actor.public_id,
            target_id = %account.public_id,
            role = account.role.code(),
            "Account role toggled"
        );
        Ok(account)
    }

    async fn load(&self, actor: &AccountId, target: &PublicId) -> AuthResult<(Account, Account)> {
        let actor = self
            .account_repo
            .find_by_id(actor)
            .await?
            .filter(Account::is_active_admin)
            .ok_or(AuthError::Forbidden)?;

        let target = self
            .account_repo
            .find_by_public_id(target)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        Ok((actor, target))
    }
}
