//! Sign In Use Case
//!
//! Authenticates through the gateway and creates a session.

use std::sync::Arc;

use kernel::error::field::FieldErrors;
use platform::client::ClientContext;

use crate::application::auth_gateway::AuthGateway;
use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::{auth_session::AuthSession, principal::Principal};
use crate::domain::repository::{
    AccountRepository, AttemptLogRepository, AuthSessionRepository, CredentialRepository,
};
use crate::domain::value_object::{login_identity::LoginIdentity, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    /// User name or email
    pub identity: String,
    pub password: String,
    pub remember_me: bool,
}

/// Sign in output
pub struct SignInOutput {
    /// Session token for cookie
    pub session_token: String,
    pub principal: Principal,
    /// Cookie `Max-Age` in seconds
    pub max_age_secs: i64,
}

impl std::fmt::Debug for SignInOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInOutput")
            .field("session_token", &"[REDACTED]")
            .field("principal", &self.principal)
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

/// Sign in use case
pub struct SignInUseCase<A, C, L, S>
where
    A: AccountRepository,
    C: CredentialRepository,
    L: AttemptLogRepository,
    S: AuthSessionRepository,
{
    gateway: AuthGateway<A, C, L>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<A, C, L, S> SignInUseCase<A, C, L, S>
where
    A: AccountRepository,
    C: CredentialRepository,
    L: AttemptLogRepository,
    S: AuthSessionRepository,
{
    pub fn new(
        account_repo: Arc<A>,
        credential_repo: Arc<C>,
        attempt_log: Arc<L>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            gateway: AuthGateway::new(account_repo, credential_repo, attempt_log, config.clone()),
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: SignInInput,
        client: &ClientContext,
    ) -> AuthResult<SignInOutput> {
        let identity = LoginIdentity::new(&input.identity);

        let mut errors = FieldErrors::new();
        if identity.is_none() {
            errors.push("user_name", "Username is required");
        }
        if input.password.is_empty() {
            errors.push("password", "Password is required");
        }
        let Some(identity) = identity else {
            return Err(AuthError::Validation(errors));
        };
        errors.into_result().map_err(AuthError::Validation)?;

        let password = RawPassword::for_login(input.password);
        let principal = self
            .gateway
            .authenticate(&identity, &password, client)
            .await?;

        let ttl = self.config.session_ttl(input.remember_me);
        let session = AuthSession::new(&principal, input.remember_me, client, ttl);
        self.session_repo.create(&session).await?;

        let session_token = session_token::sign(session.session_id, &self.config.session_secret)?;

        tracing::info!(
            public_id = %principal.public_id,
            session_id = %session.session_id,
            remember_me = input.remember_me,
            "User signed in"
        );

        Ok(SignInOutput {
            session_token,
            principal,
            max_age_secs: ttl.num_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::register::{RegisterInput, RegisterUseCase};
    use crate::infra::memory::InMemoryAuthRepository;

    type UseCase = SignInUseCase<
        InMemoryAuthRepository,
        InMemoryAuthRepository,
        InMemoryAuthRepository,
        InMemoryAuthRepository,
    >;

    async fn setup() -> (Arc<InMemoryAuthRepository>, Arc<AuthConfig>, UseCase) {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::development());
        RegisterUseCase::new(repo.clone(), config.clone())
            .execute(RegisterInput {
                user_name: "alice".into(),
                email: "alice@example.com".into(),
                password: "secret1".into(),
                confirm_password: None,
            })
            .await
            .unwrap();
        let uc = SignInUseCase::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            repo.clone(),
            config.clone(),
        );
        (repo, config, uc)
    }

    fn client() -> ClientContext {
        ClientContext::new(Some("192.0.2.1".parse().unwrap()), "test-agent")
    }

    fn input(identity: &str, password: &str, remember_me: bool) -> SignInInput {
        SignInInput {
            identity: identity.to_string(),
            password: password.to_string(),
            remember_me,
        }
    }

    #[tokio::test]
    async fn test_sign_in_creates_session() {
        let (repo, config, uc) = setup().await;
        let output = uc
            .execute(input("alice", "secret1", false), &client())
            .await
            .unwrap();

        assert_eq!(output.max_age_secs, 12 * 3600);
        let session_id = session_token::verify(&output.session_token, &config.session_secret).unwrap();
        let session = AuthSessionRepository::find_by_id(&*repo, session_id, &client().fingerprint_vec())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.public_id, output.principal.public_id);
        assert!(!session.remember_me);
    }

    #[tokio::test]
    async fn test_remember_me_uses_long_ttl() {
        let (_repo, _config, uc) = setup().await;
        let output = uc
            .execute(input("alice@example.com", "secret1", true), &client())
            .await
            .unwrap();
        assert_eq!(output.max_age_secs, 7 * 24 * 3600);
    }

    #[tokio::test]
    async fn test_blank_fields_are_validation_errors() {
        let (repo, _config, uc) = setup().await;
        let err = uc.execute(input("  ", "", false), &client()).await.unwrap_err();
        match err {
            AuthError::Validation(errors) => {
                assert!(errors.has("user_name"));
                assert!(errors.has("password"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let err = uc.execute(input("alice", "", false), &client()).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        // Nothing reached the attempt log
        let records = repo
            .find_since(&LoginIdentity::new("alice").unwrap(), chrono::DateTime::<chrono::Utc>::MIN_UTC)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_creates_no_session() {
        let (repo, _config, uc) = setup().await;
        let err = uc
            .execute(input("alice", "wrong!!", false), &client())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(repo.session_count(), 0);
    }

    #[tokio::test]
    async fn test_output_debug_hides_session_token() {
        let (_repo, _config, uc) = setup().await;
        let output = uc
            .execute(input("alice", "secret1", false), &client())
            .await
            .unwrap();
        let debug = format!("{output:?}");
        assert!(!debug.contains(&output.session_token));
        assert!(debug.contains("[REDACTED]"));
    }
}
