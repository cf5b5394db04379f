//! Register Use Case
//!
//! Creates a new account with its credential.

use std::sync::Arc;

use kernel::error::field::FieldErrors;

use crate::application::config::AuthConfig;
use crate::domain::entity::{account::Account, credential::Credential};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult, EMAIL_TAKEN_MESSAGE, USER_NAME_TAKEN_MESSAGE};

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

/// Register input
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
    /// Checked only when supplied
    pub confirm_password: Option<String>,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub account: Account,
}

/// Register use case
pub struct RegisterUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<A> RegisterUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let mut errors = FieldErrors::new();

        let user_name = errors.capture("user_name", UserName::new(&input.user_name));
        let email = errors.capture("email", Email::new(&input.email));
        let confirm_matches = input
            .confirm_password
            .as_deref()
            .is_none_or(|confirm| confirm == input.password);
        let password = errors.capture("password", RawPassword::new(input.password));
        if !confirm_matches {
            errors.push("confirm_password", PASSWORDS_DO_NOT_MATCH);
        }

        let (Some(user_name), Some(email), Some(password)) = (user_name, email, password) else {
            return Err(AuthError::Validation(errors));
        };
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        if self.account_repo.exists_by_user_name(&user_name).await? {
            errors.push("user_name", USER_NAME_TAKEN_MESSAGE);
        }
        if self.account_repo.exists_by_email(&email).await? {
            errors.push("email", EMAIL_TAKEN_MESSAGE);
        }
        errors.into_result().map_err(AuthError::Validation)?;

        let password_hash = UserPassword::from_raw(&password, self.config.pepper())?;
        let role = if self.config.is_bootstrap_admin(user_name.canonical()) {
            UserRole::Admin
        } else {
            UserRole::Member
        };

        let account = Account::new(user_name, email, role);
        let credential = Credential::new(account.account_id, password_hash);

        // Lost a race against a concurrent registration
        self.account_repo
            .create(&account, &credential)
            .await
            .map_err(|e| match e {
                AuthError::UserNameTaken => AuthError::field("user_name", USER_NAME_TAKEN_MESSAGE),
                AuthError::EmailTaken => AuthError::field("email", EMAIL_TAKEN_MESSAGE),
                other => other,
            })?;

        tracing::info!(
            public_id = %account.public_id,
            user_name = %account.user_name,
            role = account.role.code(),
            "Account registered"
        );

        Ok(RegisterOutput { account })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::AccountListing;
    use crate::domain::value_object::{
        account_id::AccountId, account_status::AccountStatus, public_id::PublicId,
    };
    use crate::infra::memory::InMemoryAuthRepository;
    use chrono::{DateTime, Utc};

    fn input(user_name: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            user_name: user_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: None,
        }
    }

    fn use_case(config: AuthConfig) -> RegisterUseCase<InMemoryAuthRepository> {
        RegisterUseCase::new(Arc::new(InMemoryAuthRepository::new()), Arc::new(config))
    }

    fn field_errors(err: AuthError) -> FieldErrors {
        match err {
            AuthError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_member() {
        let output = use_case(AuthConfig::default())
            .execute(input("Alice", "Alice@Example.COM", "secret1"))
            .await
            .unwrap();

        let account = output.account;
        assert_eq!(account.user_name.original(), "Alice");
        assert_eq!(account.user_name.canonical(), "alice");
        assert_eq!(account.email.as_str(), "alice@example.com");
        assert_eq!(account.role, UserRole::Member);
        assert_eq!(account.status, AccountStatus::Active);
        assert!(!account.email_verified);
    }

    #[tokio::test]
    async fn test_bootstrap_admin() {
        let config = AuthConfig {
            bootstrap_admins: vec!["admin".to_string()],
            ..AuthConfig::default()
        };
        let output = use_case(config)
            .execute(input("admin", "admin@example.com", "admin123!"))
            .await
            .unwrap();
        assert_eq!(output.account.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_admin_name_without_bootstrap_is_member() {
        let output = use_case(AuthConfig::default())
            .execute(input("admin", "admin@example.com", "admin123!"))
            .await
            .unwrap();
        assert_eq!(output.account.role, UserRole::Member);
    }

    #[tokio::test]
    async fn test_short_fields_report_two_errors() {
        let err = use_case(AuthConfig::default())
            .execute(input("ad", "ad@example.com", "x"))
            .await
            .unwrap_err();

        let errors = field_errors(err);
        assert_eq!(errors.len(), 2);
        assert!(errors.has("user_name"));
        assert!(errors.has("password"));
    }

    #[tokio::test]
    async fn test_all_errors_reported_together() {
        let err = use_case(AuthConfig::default())
            .execute(RegisterInput {
                user_name: String::new(),
                email: "not-an-email".to_string(),
                password: "has space".to_string(),
                confirm_password: Some("other".to_string()),
            })
            .await
            .unwrap_err();

        let errors = field_errors(err);
        assert!(errors.has("user_name"));
        assert!(errors.has("email"));
        assert!(errors.has("password"));
        assert!(errors.has("confirm_password"));
    }

    #[tokio::test]
    async fn test_length_limits() {
        let uc = use_case(AuthConfig::default());
        let long_name = "a".repeat(41);
        let err = uc
            .execute(input(&long_name, "a@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(field_errors(err).has("user_name"));

        let long_password = "p".repeat(41);
        let err = uc
            .execute(input("alice", "a@example.com", &long_password))
            .await
            .unwrap_err();
        assert!(field_errors(err).has("password"));

        uc.execute(input(&"a".repeat(40), "b@example.com", &"p".repeat(40)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_confirm_mismatch() {
        let err = use_case(AuthConfig::default())
            .execute(RegisterInput {
                confirm_password: Some("secret2".to_string()),
                ..input("alice", "alice@example.com", "secret1")
            })
            .await
            .unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors.len(), 1);
        assert!(errors.has("confirm_password"));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_case_insensitive() {
        let uc = use_case(AuthConfig::default());
        uc.execute(input("alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let err = uc
            .execute(input("bob", "ALICE@example.com", "secret1"))
            .await
            .unwrap_err();
        let errors = field_errors(err);
        assert!(errors.has("email"));
        assert!(!errors.has("user_name"));
    }

    #[tokio::test]
    async fn test_duplicate_user_name_is_case_insensitive() {
        let uc = use_case(AuthConfig::default());
        uc.execute(input("alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let err = uc
            .execute(input("ALICE", "other@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(field_errors(err).has("user_name"));
    }

    /// Existence checks that never see rows, as when a concurrent insert
    /// commits between the check and ours
    struct StaleExistsRepo(InMemoryAuthRepository);

    impl AccountRepository for StaleExistsRepo {
        async fn create(&self, account: &Account, credential: &Credential) -> AuthResult<()> {
            self.0.create(account, credential).await
        }

        async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
            AccountRepository::find_by_id(&self.0, account_id).await
        }

        async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Account>> {
            self.0.find_by_public_id(public_id).await
        }

        async fn find_by_user_name(&self, canonical: &str) -> AuthResult<Option<Account>> {
            self.0.find_by_user_name(canonical).await
        }

        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
            self.0.find_by_email(email).await
        }

        async fn exists_by_user_name(&self, _user_name: &UserName) -> AuthResult<bool> {
            Ok(false)
        }

        async fn exists_by_email(&self, _email: &Email) -> AuthResult<bool> {
            Ok(false)
        }

        async fn update(&self, account: &Account) -> AuthResult<()> {
            AccountRepository::update(&self.0, account).await
        }

        async fn touch_last_seen(&self, account_id: &AccountId, at: DateTime<Utc>) -> AuthResult<()> {
            self.0.touch_last_seen(account_id, at).await
        }

        async fn list(&self, listing: AccountListing) -> AuthResult<Vec<Account>> {
            self.0.list(listing).await
        }
    }

    fn taken_message(errors: &FieldErrors, field: &str) -> String {
        errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.to_string())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_insert_conflict_after_stale_check_is_field_error() {
        let uc = RegisterUseCase::new(
            Arc::new(StaleExistsRepo(InMemoryAuthRepository::new())),
            Arc::new(AuthConfig::default()),
        );
        uc.execute(input("alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let err = uc
            .execute(input("bob", "alice@example.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_app_error().status_code(), 422);
        let errors = field_errors(err);
        assert_eq!(errors.len(), 1);
        assert_eq!(taken_message(&errors, "email"), EMAIL_TAKEN_MESSAGE);

        let err = uc
            .execute(input("Alice", "other@example.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_app_error().status_code(), 422);
        let errors = field_errors(err);
        assert_eq!(errors.len(), 1);
        assert_eq!(taken_message(&errors, "user_name"), USER_NAME_TAKEN_MESSAGE);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_email_one_wins() {
        let uc = Arc::new(use_case(AuthConfig::default()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let uc = uc.clone();
                tokio::spawn(async move {
                    uc.execute(input(&format!("user{i}"), "same@example.com", "secret1"))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(field_errors(err).has("email")),
            }
        }
        assert_eq!(created, 1);
    }
}
