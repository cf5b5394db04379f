//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::{
    account::Account, attempt_record::AttemptRecord, auth_session::AuthSession,
    auth_token::AuthToken, credential::Credential,
};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, login_identity::LoginIdentity, public_id::PublicId,
    token_purpose::TokenPurpose, user_name::UserName,
};
use crate::error::AuthResult;

/// Which accounts a user list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountListing {
    /// Every account, newest first (administrators)
    All,
    /// Active accounts ordered by user name
    ActiveOnly,
}

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert the account and its credential in one transaction
    ///
    /// A uniqueness violation yields `AuthError::UserNameTaken` or
    /// `AuthError::EmailTaken`.
    async fn create(&self, account: &Account, credential: &Credential) -> AuthResult<()>;

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Account>>;

    /// Lookup by canonical (lowercase) user name
    async fn find_by_user_name(&self, canonical: &str) -> AuthResult<Option<Account>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Persist role, status and email verification
    async fn update(&self, account: &Account) -> AuthResult<()>;

    async fn touch_last_seen(&self, account_id: &AccountId, at: DateTime<Utc>) -> AuthResult<()>;

    async fn list(&self, listing: AccountListing) -> AuthResult<Vec<Account>>;
}

/// Credential repository trait
#[trait_variant::make(CredentialRepository: Send)]
pub trait LocalCredentialRepository {
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Credential>>;

    async fn update(&self, credential: &Credential) -> AuthResult<()>;
}

/// Append-only attempt log
#[trait_variant::make(AttemptLogRepository: Send)]
pub trait LocalAttemptLogRepository {
    async fn append(&self, record: &AttemptRecord) -> AuthResult<()>;

    /// Records for `identity` strictly after `after`, oldest first
    async fn find_since(
        &self,
        identity: &LoginIdentity,
        after: DateTime<Utc>,
    ) -> AuthResult<Vec<AttemptRecord>>;

    /// Like `find_since` without `Locked` denials, which lockout never counts
    async fn find_counted_since(
        &self,
        identity: &LoginIdentity,
        after: DateTime<Utc>,
    ) -> AuthResult<Vec<AttemptRecord>>;

    /// Delete records at or before `cutoff`
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64>;
}

/// Auth token repository trait
#[trait_variant::make(AuthTokenRepository: Send)]
pub trait LocalAuthTokenRepository {
    /// Store a new token, marking earlier unused tokens of the same account
    /// and purpose used, in one transaction
    async fn issue(&self, token: &AuthToken) -> AuthResult<()>;

    /// Atomically mark a valid token used and return it
    ///
    /// `None` for unknown, used, expired or wrong-purpose tokens.
    async fn consume(
        &self,
        token_hash: &[u8; 32],
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<AuthToken>>;

    /// Delete tokens that expired before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Auth session repository trait
#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Find session by ID and verify fingerprint
    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>>;

    /// Update last activity and expiry
    async fn update(&self, session: &AuthSession) -> AuthResult<()>;

    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Delete all sessions for an account, optionally keeping one
    async fn delete_all_for_account(
        &self,
        account_id: &AccountId,
        except: Option<Uuid>,
    ) -> AuthResult<u64>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Every repository the auth context needs, behind one handle
pub trait AuthStore:
    AccountRepository
    + CredentialRepository
    + AttemptLogRepository
    + AuthTokenRepository
    + AuthSessionRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: AccountRepository
        + CredentialRepository
        + AttemptLogRepository
        + AuthTokenRepository
        + AuthSessionRepository
        + Send
        + Sync
        + 'static
{
}
