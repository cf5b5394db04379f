//! Sign Out Use Case
//!
//! Invalidates a user session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::repository::AuthSessionRepository;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: AuthSessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SignOutUseCase<S>
where
    S: AuthSessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Delete the session behind the cookie, if any
    ///
    /// A missing or forged token is not an error: the caller clears the
    /// cookie either way.
    pub async fn execute(&self, session_token: Option<&str>) -> AuthResult<()> {
        let Some(session_id) =
            session_token.and_then(|t| session_token::verify(t, &self.config.session_secret))
        else {
            tracing::debug!("Sign out without a valid session token");
            return Ok(());
        };

        self.session_repo.delete(session_id).await?;

        tracing::info!(session_id = %session_id, "User signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{auth_session::AuthSession, principal::Principal};
    use crate::domain::value_object::{
        account_id::AccountId, public_id::PublicId, user_name::UserName, user_role::UserRole,
    };
    use crate::infra::memory::InMemoryAuthRepository;
    use platform::client::ClientContext;

    #[tokio::test]
    async fn test_sign_out_deletes_session() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::development());
        let principal = Principal {
            account_id: AccountId::new(),
            public_id: PublicId::new(),
            user_name: UserName::new("alice").unwrap(),
            role: UserRole::Member,
        };
        let client = ClientContext::new(None, "ua");
        let session = AuthSession::new(&principal, false, &client, chrono::Duration::hours(1));
        repo.create(&session).await.unwrap();
        let token = session_token::sign(session.session_id, &config.session_secret).unwrap();

        let uc = SignOutUseCase::new(repo.clone(), config);
        uc.execute(Some(&token)).await.unwrap();
        assert_eq!(repo.session_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_without_session_is_ok() {
        let uc = SignOutUseCase::new(
            Arc::new(InMemoryAuthRepository::new()),
            Arc::new(AuthConfig::development()),
        );
        uc.execute(None).await.unwrap();
        uc.execute(Some("garbage")).await.unwrap();
    }
}
