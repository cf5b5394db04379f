//! Change Password Use Case

use std::sync::Arc;

use kernel::error::field::FieldErrors;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::repository::{AuthSessionRepository, CredentialRepository};
use crate::domain::value_object::{
    account_id::AccountId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub const CURRENT_PASSWORD_INCORRECT: &str = "Current password is incorrect";
pub const NEW_PASSWORDS_DO_NOT_MATCH: &str = "New passwords do not match";

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Change password use case
///
/// Other sessions of the account are signed out; the current one stays.
pub struct ChangePasswordUseCase<C, S>
where
    C: CredentialRepository,
    S: AuthSessionRepository,
{
    credential_repo: Arc<C>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<C, S> ChangePasswordUseCase<C, S>
where
    C: CredentialRepository,
    S: AuthSessionRepository,
{
    pub fn new(credential_repo: Arc<C>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            credential_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        account_id: &AccountId,
        current_session: Uuid,
        input: ChangePasswordInput,
    ) -> AuthResult<()> {
        let mut credential = self
            .credential_repo
            .find_by_account_id(account_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credential not found".to_string()))?;

        let pepper = self.config.pepper();
        let mut errors = FieldErrors::new();

        let current = RawPassword::for_login(input.current_password);
        if !credential.password_hash.verify(&current, pepper) {
            errors.push("current_password", CURRENT_PASSWORD_INCORRECT);
        }

        let confirm_matches = input.new_password == input.confirm_new_password;
        let new_password = errors.capture("new_password", RawPassword::new(input.new_password));
        if !confirm_matches {
            errors.push("confirm_new_password", NEW_PASSWORDS_DO_NOT_MATCH);
        }

        let Some(new_password) = new_password else {
            return Err(AuthError::Validation(errors));
        };
        errors.into_result().map_err(AuthError::Validation)?;

        credential.set_password(UserPassword::from_raw(&new_password, pepper)?);
        self.credential_repo.update(&credential).await?;

        let revoked = self
            .session_repo
            .delete_all_for_account(account_id, Some(current_session))
            .await?;

        tracing::info!(
            account_id = %account_id,
            sessions_revoked = revoked,
            "Password changed"
        );

        Ok(())
    }
}
