//! In-Memory Repository Implementations
//!
//! Same contracts as the PostgreSQL repository, including canonical user
//! name and email uniqueness. Used by tests and local experiments.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::{
    account::Account, attempt_record::AttemptRecord, auth_session::AuthSession,
    auth_token::AuthToken, credential::Credential,
};
use crate::domain::repository::{
    AccountListing, AccountRepository, AttemptLogRepository, AuthSessionRepository,
    AuthTokenRepository, CredentialRepository,
};
use crate::domain::value_object::{
    account_id::AccountId, attempt_outcome::AttemptOutcome, email::Email,
    login_identity::LoginIdentity, public_id::PublicId, token_purpose::TokenPurpose,
    user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    credentials: HashMap<Uuid, Credential>,
    attempts: Vec<AttemptRecord>,
    tokens: Vec<AuthToken>,
    sessions: HashMap<Uuid, AuthSession>,
}

/// Auth repository held in process memory
#[derive(Default)]
pub struct InMemoryAuthRepository {
    state: Mutex<State>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicked writer leaves plain data behind; keep serving it
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AccountRepository for InMemoryAuthRepository {
    async fn create(&self, account: &Account, credential: &Credential) -> AuthResult<()> {
        let mut state = self.lock();
        let user_name = account.user_name.canonical();
        if state
            .accounts
            .values()
            .any(|a| a.user_name.canonical() == user_name)
        {
            return Err(AuthError::UserNameTaken);
        }
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(AuthError::EmailTaken);
        }

        let id = account.account_id.into_uuid();
        state.accounts.insert(id, account.clone());
        state.credentials.insert(id, credential.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.lock().accounts.get(account_id.as_uuid()).cloned())
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Account>> {
        Ok(self
            .lock()
            .accounts
            .values()
            .find(|a| a.public_id == *public_id)
            .cloned())
    }

    async fn find_by_user_name(&self, canonical: &str) -> AuthResult<Option<Account>> {
        Ok(self
            .lock()
            .accounts
            .values()
            .find(|a| a.user_name.canonical() == canonical)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        Ok(self
            .lock()
            .accounts
            .values()
            .find(|a| a.email == *email)
            .cloned())
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        Ok(self
            .lock()
            .accounts
            .values()
            .any(|a| a.user_name.canonical() == user_name.canonical()))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.lock().accounts.values().any(|a| a.email == *email))
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        let mut state = self.lock();
        if let Some(stored) = state.accounts.get_mut(account.account_id.as_uuid()) {
            stored.role = account.role;
            stored.status = account.status;
            stored.email_verified = account.email_verified;
            stored.updated_at = account.updated_at;
        }
        Ok(())
    }

    async fn touch_last_seen(&self, account_id: &AccountId, at: DateTime<Utc>) -> AuthResult<()> {
        if let Some(stored) = self.lock().accounts.get_mut(account_id.as_uuid()) {
            stored.last_seen_at = Some(at);
        }
        Ok(())
    }

    async fn list(&self, listing: AccountListing) -> AuthResult<Vec<Account>> {
        let state = self.lock();
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        match listing {
            AccountListing::All => accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            AccountListing::ActiveOnly => {
                accounts.retain(Account::can_login);
                accounts.sort_by(|a, b| a.user_name.canonical().cmp(b.user_name.canonical()));
            }
        }
        Ok(accounts)
    }
}

impl CredentialRepository for InMemoryAuthRepository {
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Credential>> {
        Ok(self.lock().credentials.get(account_id.as_uuid()).cloned())
    }

    async fn update(&self, credential: &Credential) -> AuthResult<()> {
        self.lock()
            .credentials
            .insert(credential.account_id.into_uuid(), credential.clone());
        Ok(())
    }
}

impl AttemptLogRepository for InMemoryAuthRepository {
    async fn append(&self, record: &AttemptRecord) -> AuthResult<()> {
        self.lock().attempts.push(record.clone());
        Ok(())
    }

    async fn find_since(
        &self,
        identity: &LoginIdentity,
        after: DateTime<Utc>,
    ) -> AuthResult<Vec<AttemptRecord>> {
        let mut records: Vec<AttemptRecord> = self
            .lock()
            .attempts
            .iter()
            .filter(|r| r.identity == *identity && r.attempted_at > after)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.attempted_at);
        Ok(records)
    }

    async fn find_counted_since(
        &self,
        identity: &LoginIdentity,
        after: DateTime<Utc>,
    ) -> AuthResult<Vec<AttemptRecord>> {
        let mut records = self.find_since(identity, after).await?;
        records.retain(|r| r.outcome != AttemptOutcome::Locked);
        Ok(records)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.lock();
        let before = state.attempts.len();
        state.attempts.retain(|r| r.attempted_at > cutoff);
        Ok((before - state.attempts.len()) as u64)
    }
}

impl AuthTokenRepository for InMemoryAuthRepository {
    async fn issue(&self, token: &AuthToken) -> AuthResult<()> {
        let mut state = self.lock();
        for previous in state.tokens.iter_mut().filter(|t| {
            t.account_id == token.account_id && t.purpose == token.purpose && t.used_at.is_none()
        }) {
            previous.used_at = Some(token.created_at);
        }
        state.tokens.push(token.clone());
        Ok(())
    }

    async fn consume(
        &self,
        token_hash: &[u8; 32],
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<AuthToken>> {
        let mut state = self.lock();
        let token = state
            .tokens
            .iter_mut()
            .find(|t| t.token_hash == *token_hash && t.purpose == purpose && t.is_valid_at(now));
        Ok(token.map(|t| {
            t.used_at = Some(now);
            t.clone()
        }))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.lock();
        let before = state.tokens.len();
        state.tokens.retain(|t| t.expires_at >= now);
        Ok((before - state.tokens.len()) as u64)
    }
}

impl AuthSessionRepository for InMemoryAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        self.lock()
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let now_ms = Utc::now().timestamp_millis();
        let state = self.lock();
        let Some(session) = state
            .sessions
            .get(&session_id)
            .filter(|s| s.expires_at_ms > now_ms)
        else {
            return Ok(None);
        };

        if session.client_fingerprint_hash != fingerprint_hash {
            tracing::warn!(session_id = %session_id, "Auth session fingerprint mismatch");
            return Ok(None);
        }
        Ok(Some(session.clone()))
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        if let Some(stored) = self.lock().sessions.get_mut(&session.session_id) {
            stored.expires_at_ms = session.expires_at_ms;
            stored.last_activity_at = session.last_activity_at;
        }
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.lock().sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_all_for_account(
        &self,
        account_id: &AccountId,
        except: Option<Uuid>,
    ) -> AuthResult<u64> {
        let mut state = self.lock();
        let before = state.sessions.len();
        state
            .sessions
            .retain(|id, s| s.account_id != *account_id || Some(*id) == except);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut state = self.lock();
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.expires_at_ms >= now_ms);
        Ok((before - state.sessions.len()) as u64)
    }
}
