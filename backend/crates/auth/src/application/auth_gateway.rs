//! Auth Gateway
//!
//! Single entry point for credential checks. Order per call:
//! 1. lockout policy over the identity's recent attempts
//! 2. account lookup (user name, then email)
//! 3. password verification (dummy verification when no account matched)
//! 4. one attempt record, whatever the branch
//!
//! Every failure, lockout included, surfaces as
//! `AuthError::InvalidCredentials`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::client::ClientContext;

use crate::application::config::AuthConfig;
use crate::domain::entity::{
    account::Account, attempt_record::AttemptRecord, principal::Principal,
};
use crate::domain::repository::{AccountRepository, AttemptLogRepository, CredentialRepository};
use crate::domain::service::lockout_policy::LockoutDecision;
use crate::domain::value_object::{
    attempt_outcome::AttemptOutcome,
    login_identity::LoginIdentity,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct AuthGateway<A, C, L>
where
    A: AccountRepository,
    C: CredentialRepository,
    L: AttemptLogRepository,
{
    account_repo: Arc<A>,
    credential_repo: Arc<C>,
    attempt_log: Arc<L>,
    config: Arc<AuthConfig>,
}

impl<A, C, L> AuthGateway<A, C, L>
where
    A: AccountRepository,
    C: CredentialRepository,
    L: AttemptLogRepository,
{
    pub fn new(
        account_repo: Arc<A>,
        credential_repo: Arc<C>,
        attempt_log: Arc<L>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            account_repo,
            credential_repo,
            attempt_log,
            config,
        }
    }

    pub async fn authenticate(
        &self,
        identity: &LoginIdentity,
        password: &RawPassword,
        client: &ClientContext,
    ) -> AuthResult<Principal> {
        self.authenticate_at(identity, password, client, Utc::now())
            .await
    }

    /// `authenticate` against an explicit clock
    pub async fn authenticate_at(
        &self,
        identity: &LoginIdentity,
        password: &RawPassword,
        client: &ClientContext,
        now: DateTime<Utc>,
    ) -> AuthResult<Principal> {
        let policy = &self.config.lockout;
        let recent = self
            .attempt_log
            .find_counted_since(identity, policy.window_start(now))
            .await?;

        if let LockoutDecision::Deny {
            failures,
            retry_after,
        } = policy.evaluate(&recent, &client.ip_string(), now)
        {
            self.record(identity, client, AttemptOutcome::Locked, now)
                .await?;
            tracing::warn!(
                identity = %identity,
                source_ip = %client.ip_string(),
                failures,
                retry_after_secs = retry_after.as_secs(),
                "Login denied by lockout policy"
            );
            return Err(AuthError::InvalidCredentials);
        }

        let account = self.find_account(identity).await?;
        let verified = match &account {
            Some(account) => self.verify_password(account, password).await?,
            None => {
                UserPassword::verify_dummy(password, self.config.pepper());
                false
            }
        };

        let account = match account {
            Some(account) if verified && account.can_login() => account,
            account => {
                self.record(identity, client, AttemptOutcome::Failure, now)
                    .await?;
                tracing::info!(
                    identity = %identity,
                    source_ip = %client.ip_string(),
                    known = account.is_some(),
                    "Login failed"
                );
                return Err(AuthError::InvalidCredentials);
            }
        };

        self.record(identity, client, AttemptOutcome::Success, now)
            .await?;
        self.account_repo
            .touch_last_seen(&account.account_id, now)
            .await?;

        Ok(Principal::from(&account))
    }

    /// User name first: user names may legally contain `@`
    async fn find_account(&self, identity: &LoginIdentity) -> AuthResult<Option<Account>> {
        if let Some(account) = self.account_repo.find_by_user_name(identity.as_str()).await? {
            return Ok(Some(account));
        }
        match identity.as_email() {
            Some(email) => self.account_repo.find_by_email(&email).await,
            None => Ok(None),
        }
    }

    async fn verify_password(&self, account: &Account, password: &RawPassword) -> AuthResult<bool> {
        let pepper = self.config.pepper();
        match self
            .credential_repo
            .find_by_account_id(&account.account_id)
            .await?
        {
            Some(credential) => Ok(credential.password_hash.verify(password, pepper)),
            None => {
                tracing::error!(public_id = %account.public_id, "Account has no credential");
                UserPassword::verify_dummy(password, pepper);
                Ok(false)
            }
        }
    }

    async fn record(
        &self,
        identity: &LoginIdentity,
        client: &ClientContext,
        outcome: AttemptOutcome,
        now: DateTime<Utc>,
    ) -> AuthResult<()> {
        let record = AttemptRecord::new(identity.clone(), client, outcome, now);
        self.attempt_log.append(&record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::register::{RegisterInput, RegisterUseCase};
    use crate::domain::service::lockout_policy::LockoutPolicy;
    use crate::infra::memory::InMemoryAuthRepository;
    use chrono::TimeDelta;

    type Gateway = AuthGateway<InMemoryAuthRepository, InMemoryAuthRepository, InMemoryAuthRepository>;

    fn client() -> ClientContext {
        ClientContext::new(Some("192.0.2.10".parse().unwrap()), "test-agent")
    }

    async fn setup(config: AuthConfig) -> (Arc<InMemoryAuthRepository>, Gateway) {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(config);
        RegisterUseCase::new(repo.clone(), config.clone())
            .execute(RegisterInput {
                user_name: "alice".into(),
                email: "alice@example.com".into(),
                password: "secret1".into(),
                confirm_password: None,
            })
            .await
            .unwrap();
        let gateway = AuthGateway::new(repo.clone(), repo.clone(), repo.clone(), config);
        (repo, gateway)
    }

    fn identity(s: &str) -> LoginIdentity {
        LoginIdentity::new(s).unwrap()
    }

    fn password(s: &str) -> RawPassword {
        RawPassword::for_login(s.to_string())
    }

    async fn outcomes(repo: &InMemoryAuthRepository, who: &str) -> Vec<AttemptOutcome> {
        repo.find_since(&identity(who), DateTime::<Utc>::MIN_UTC)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.outcome)
            .collect()
    }

    #[tokio::test]
    async fn test_login_by_user_name_and_email() {
        let (repo, gateway) = setup(AuthConfig::default()).await;

        let principal = gateway
            .authenticate(&identity("ALICE"), &password("secret1"), &client())
            .await
            .unwrap();
        assert_eq!(principal.user_name.original(), "alice");

        gateway
            .authenticate(&identity("Alice@Example.com"), &password("secret1"), &client())
            .await
            .unwrap();

        let account = repo.find_by_user_name("alice").await.unwrap().unwrap();
        assert!(account.last_seen_at.is_some());
    }

    #[tokio::test]
    async fn test_every_branch_writes_one_record() {
        let (repo, gateway) = setup(AuthConfig::default()).await;

        let _ = gateway
            .authenticate(&identity("alice"), &password("secret1"), &client())
            .await;
        let _ = gateway
            .authenticate(&identity("alice"), &password("wrong!!"), &client())
            .await;
        let _ = gateway
            .authenticate(&identity("nobody"), &password("whatever"), &client())
            .await;

        assert_eq!(
            outcomes(&repo, "alice").await,
            vec![AttemptOutcome::Success, AttemptOutcome::Failure]
        );
        assert_eq!(outcomes(&repo, "nobody").await, vec![AttemptOutcome::Failure]);
    }

    #[tokio::test]
    async fn test_sixth_attempt_denied_even_with_correct_password() {
        let (repo, gateway) = setup(AuthConfig::default()).await;

        for _ in 0..5 {
            let err = gateway
                .authenticate(&identity("alice"), &password("wrong!!"), &client())
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }

        let denied = gateway
            .authenticate(&identity("alice"), &password("secret1"), &client())
            .await
            .unwrap_err();
        let wrong = AuthError::InvalidCredentials;
        assert_eq!(denied.to_string(), wrong.to_string());
        assert_eq!(denied.kind(), wrong.kind());
        assert_eq!(
            denied.to_app_error().to_string(),
            wrong.to_app_error().to_string()
        );

        assert_eq!(outcomes(&repo, "alice").await.last(), Some(&AttemptOutcome::Locked));
    }

    #[tokio::test]
    async fn test_lockout_applies_to_unknown_identities() {
        let (repo, gateway) = setup(AuthConfig::default()).await;
        for _ in 0..6 {
            let _ = gateway
                .authenticate(&identity("ghost"), &password("guess123"), &client())
                .await;
        }
        assert_eq!(outcomes(&repo, "ghost").await.last(), Some(&AttemptOutcome::Locked));
    }

    #[tokio::test]
    async fn test_lockout_expires_with_window() {
        let (_repo, gateway) = setup(AuthConfig::default()).await;
        let start = Utc::now() - TimeDelta::hours(2);

        for i in 0..5 {
            let _ = gateway
                .authenticate_at(
                    &identity("alice"),
                    &password("wrong!!"),
                    &client(),
                    start + TimeDelta::seconds(i),
                )
                .await;
        }

        // Inside the hour: locked
        let locked = gateway
            .authenticate_at(
                &identity("alice"),
                &password("secret1"),
                &client(),
                start + TimeDelta::minutes(30),
            )
            .await;
        assert!(locked.is_err());

        // One window after the last failure every failure has left
        let later = start + TimeDelta::hours(1) + TimeDelta::seconds(4);
        assert!(
            gateway
                .authenticate_at(&identity("alice"), &password("secret1"), &client(), later)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_repeated_denials_do_not_extend_lockout() {
        let (repo, gateway) = setup(AuthConfig::default()).await;
        let start = Utc::now() - TimeDelta::hours(2);

        for i in 0..5 {
            let _ = gateway
                .authenticate_at(
                    &identity("alice"),
                    &password("wrong!!"),
                    &client(),
                    start + TimeDelta::seconds(i),
                )
                .await;
        }
        for minute in 1..60 {
            let _ = gateway
                .authenticate_at(
                    &identity("alice"),
                    &password("secret1"),
                    &client(),
                    start + TimeDelta::minutes(minute),
                )
                .await;
        }

        let counted = repo
            .find_counted_since(&identity("alice"), DateTime::<Utc>::MIN_UTC)
            .await
            .unwrap();
        assert_eq!(counted.len(), 5);
        assert_eq!(outcomes(&repo, "alice").await.len(), 64);

        let later = start + TimeDelta::hours(1) + TimeDelta::seconds(4);
        assert!(
            gateway
                .authenticate_at(&identity("alice"), &password("secret1"), &client(), later)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_lockout_is_per_submitted_identity() {
        let (repo, gateway) = setup(AuthConfig::default()).await;
        for _ in 0..5 {
            let _ = gateway
                .authenticate(&identity("alice"), &password("wrong!!"), &client())
                .await;
        }
        assert!(
            gateway
                .authenticate(&identity("alice"), &password("secret1"), &client())
                .await
                .is_err()
        );

        // The email spelling keeps its own budget
        gateway
            .authenticate(&identity("alice@example.com"), &password("secret1"), &client())
            .await
            .unwrap();
        assert_eq!(
            outcomes(&repo, "alice@example.com").await,
            vec![AttemptOutcome::Success]
        );
    }

    #[tokio::test]
    async fn test_success_does_not_clear_failures_by_default() {
        let (_repo, gateway) = setup(AuthConfig::default()).await;

        for _ in 0..4 {
            let _ = gateway
                .authenticate(&identity("alice"), &password("wrong!!"), &client())
                .await;
        }
        gateway
            .authenticate(&identity("alice"), &password("secret1"), &client())
            .await
            .unwrap();

        // Fifth failure in the window locks, the success did not reset
        let _ = gateway
            .authenticate(&identity("alice"), &password("wrong!!"), &client())
            .await;
        assert!(
            gateway
                .authenticate(&identity("alice"), &password("secret1"), &client())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_reset_on_success_narrows_window() {
        let config = AuthConfig {
            lockout: LockoutPolicy {
                reset_on_success: true,
                ..Default::default()
            },
            ..AuthConfig::default()
        };
        let (_repo, gateway) = setup(config).await;
        let start = Utc::now() - TimeDelta::minutes(30);

        for i in 0..4 {
            let _ = gateway
                .authenticate_at(
                    &identity("alice"),
                    &password("wrong!!"),
                    &client(),
                    start + TimeDelta::seconds(i),
                )
                .await;
        }
        gateway
            .authenticate_at(
                &identity("alice"),
                &password("secret1"),
                &client(),
                start + TimeDelta::seconds(10),
            )
            .await
            .unwrap();
        let _ = gateway
            .authenticate_at(
                &identity("alice"),
                &password("wrong!!"),
                &client(),
                start + TimeDelta::seconds(20),
            )
            .await;

        // Only one failure counts after the success
        assert!(
            gateway
                .authenticate_at(
                    &identity("alice"),
                    &password("secret1"),
                    &client(),
                    start + TimeDelta::seconds(30),
                )
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_inactive_account_fails_generically() {
        let (repo, gateway) = setup(AuthConfig::default()).await;
        let mut account = repo.find_by_user_name("alice").await.unwrap().unwrap();
        account.toggle_status();
        AccountRepository::update(&*repo, &account).await.unwrap();

        let err = gateway
            .authenticate(&identity("alice"), &password("secret1"), &client())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(outcomes(&repo, "alice").await, vec![AttemptOutcome::Failure]);
    }
}
