//! Auth Tokens Use Case
//!
//! Single-use password-reset and email-verification tokens. Only the
//! SHA-256 of a secret is stored; the plaintext leaves the service once,
//! in the issue response.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::error::field::FieldErrors;

use crate::application::config::AuthConfig;
use crate::domain::entity::{account::Account, auth_token::AuthToken};
use crate::domain::repository::{
    AccountRepository, AuthSessionRepository, AuthTokenRepository, CredentialRepository,
};
use crate::domain::value_object::{
    account_id::AccountId,
    public_id::PublicId,
    token_purpose::TokenPurpose,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Freshly issued token
pub struct IssuedToken {
    /// Plaintext secret, never stored
    pub token: String,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("purpose", &self.purpose)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub struct PasswordResetInput {
    pub token: String,
    pub new_password: String,
    pub confirm_new_password: Option<String>,
}

pub struct AuthTokensUseCase<A, C, T, S>
where
    A: AccountRepository,
    C: CredentialRepository,
    T: AuthTokenRepository,
    S: AuthSessionRepository,
{
    account_repo: Arc<A>,
    credential_repo: Arc<C>,
    token_repo: Arc<T>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<A, C, T, S> AuthTokensUseCase<A, C, T, S>
where
    A: AccountRepository,
    C: CredentialRepository,
    T: AuthTokenRepository,
    S: AuthSessionRepository,
{
    pub fn new(
        account_repo: Arc<A>,
        credential_repo: Arc<C>,
        token_repo: Arc<T>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            account_repo,
            credential_repo,
            token_repo,
            session_repo,
            config,
        }
    }

    /// Issue a token for `target`; the actor must be an active administrator
    pub async fn issue(
        &self,
        actor: &AccountId,
        target: &PublicId,
        purpose: TokenPurpose,
    ) -> AuthResult<IssuedToken> {
        self.account_repo
            .find_by_id(actor)
            .await?
            .filter(Account::is_active_admin)
            .ok_or(AuthError::Forbidden)?;

        let account = self
            .account_repo
            .find_by_public_id(target)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let (token, secret) =
            AuthToken::issue(account.account_id, purpose, self.config.token_ttl_chrono());
        self.token_repo.issue(&token).await?;

        tracing::info!(
            target_id = %account.public_id,
            purpose = purpose.code(),
            expires_at = %token.expires_at,
            "Auth token issued"
        );

        Ok(IssuedToken {
            token: secret,
            purpose,
            expires_at: token.expires_at,
        })
    }

    /// Set a new password with a reset token and sign the account out
    /// everywhere
    ///
    /// The password is validated before the token is spent.
    pub async fn reset_password(&self, input: PasswordResetInput) -> AuthResult<()> {
        let mut errors = FieldErrors::new();
        let confirm_matches = input
            .confirm_new_password
            .as_deref()
            .is_none_or(|confirm| confirm == input.new_password);
        let new_password = errors.capture("new_password", RawPassword::new(input.new_password));
        if !confirm_matches {
            errors.push("confirm_new_password", "New passwords do not match");
        }
        let Some(new_password) = new_password else {
            return Err(AuthError::Validation(errors));
        };
        errors.into_result().map_err(AuthError::Validation)?;

        let token = self.consume(&input.token, TokenPurpose::PasswordReset).await?;

        let mut credential = self
            .credential_repo
            .find_by_account_id(&token.account_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credential not found".to_string()))?;
        credential.set_password(UserPassword::from_raw(&new_password, self.config.pepper())?);
        self.credential_repo.update(&credential).await?;

        let revoked = self
            .session_repo
            .delete_all_for_account(&token.account_id, None)
            .await?;

        tracing::info!(
            account_id = %token.account_id,
            sessions_revoked = revoked,
            "Password reset with token"
        );
        Ok(())
    }

    /// Mark the token's account email as verified
    pub async fn verify_email(&self, secret: &str) -> AuthResult<Account> {
        let token = self
            .consume(secret, TokenPurpose::EmailVerification)
            .await?;

        let mut account = self
            .account_repo
            .find_by_id(&token.account_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;
        account.mark_email_verified();
        self.account_repo.update(&account).await?;

        tracing::info!(public_id = %account.public_id, "Email verified");
        Ok(account)
    }

    async fn consume(&self, secret: &str, purpose: TokenPurpose) -> AuthResult<AuthToken> {
        if secret.trim().is_empty() {
            return Err(AuthError::TokenInvalid);
        }
        self.token_repo
            .consume(&AuthToken::hash_secret(secret), purpose, Utc::now())
            .await?
            .ok_or(AuthError::TokenInvalid)
    }
}
