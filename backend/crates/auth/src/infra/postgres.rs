//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::unique_violation_constraint;
use sqlx::PgPool;
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
    account_id::{AccountId, AttemptId, TokenId},
    account_status::AccountStatus,
    attempt_outcome::AttemptOutcome,
    email::Email,
    login_identity::LoginIdentity,
    public_id::PublicId,
    token_purpose::TokenPurpose,
    user_name::UserName,
    user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Constraint names from the migrations
const USER_NAME_UNIQUE: &str = "users_user_name_canonical_key";
const EMAIL_UNIQUE: &str = "users_email_key";

const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    public_id,
    user_name,
    email,
    user_role,
    account_status,
    email_verified,
    last_seen_at,
    created_at,
    updated_at
"#;

const SESSION_COLUMNS: &str = r#"
    session_id,
    account_id,
    public_id,
    user_role,
    expires_at_ms,
    remember_me,
    client_fingerprint_hash,
    client_ip,
    user_agent,
    created_at,
    last_activity_at
"#;

const TOKEN_COLUMNS: &str = r#"
    token_id,
    account_id,
    purpose,
    token_hash,
    created_at,
    expires_at,
    used_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }

    async fn find_account(&self, column: &str, value: &str) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }
}

/// Map a unique violation on `users` to the matching "taken" error
fn map_account_insert_error(err: sqlx::Error) -> AuthError {
    let taken = match unique_violation_constraint(&err) {
        Some(USER_NAME_UNIQUE) => Some(AuthError::UserNameTaken),
        Some(EMAIL_UNIQUE) => Some(AuthError::EmailTaken),
        _ => None,
    };
    taken.unwrap_or(AuthError::Database(err))
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAuthRepository {
    async fn create(&self, account: &Account, credential: &Credential) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                account_id,
                public_id,
                user_name,
                user_name_canonical,
                email,
                user_role,
                account_status,
                email_verified,
                last_seen_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.public_id.as_str())
        .bind(account.user_name.original())
        .bind(account.user_name.canonical())
        .bind(account.email.as_str())
        .bind(account.role.id())
        .bind(account.status.id())
        .bind(account.email_verified)
        .bind(account.last_seen_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_account_insert_error)?;

        sqlx::query(
            r#"
            INSERT INTO auth_credentials (
                account_id,
                password_hash,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(credential.account_id.as_uuid())
        .bind(credential.password_hash.as_phc_string())
        .bind(credential.created_at)
        .bind(credential.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE account_id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Account>> {
        self.find_account("public_id", public_id.as_str()).await
    }

    async fn find_by_user_name(&self, canonical: &str) -> AuthResult<Option<Account>> {
        self.find_account("user_name_canonical", canonical).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        self.find_account("email", email.as_str()).await
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_name_canonical = $1)",
        )
        .bind(user_name.canonical())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                user_role = $2,
                account_status = $3,
                email_verified = $4,
                updated_at = $5
            WHERE account_id = $1
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.role.id())
        .bind(account.status.id())
        .bind(account.email_verified)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn touch_last_seen(&self, account_id: &AccountId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE users SET last_seen_at = $2 WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list(&self, listing: AccountListing) -> AuthResult<Vec<Account>> {
        let filter = match listing {
            AccountListing::All => "ORDER BY created_at DESC",
            AccountListing::ActiveOnly => {
                "WHERE account_status = 0 ORDER BY user_name_canonical ASC"
            }
        };
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users {filter}");
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }
}

// ============================================================================
// Credential Repository Implementation
// ============================================================================

impl CredentialRepository for PgAuthRepository {
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT
                account_id,
                password_hash,
                created_at,
                updated_at
            FROM auth_credentials
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CredentialRow::into_credential).transpose()
    }

    async fn update(&self, credential: &Credential) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_credentials SET
                password_hash = $2,
                updated_at = $3
            WHERE account_id = $1
            "#,
        )
        .bind(credential.account_id.as_uuid())
        .bind(credential.password_hash.as_phc_string())
        .bind(credential.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Attempt Log Implementation
// ============================================================================

impl AttemptLogRepository for PgAuthRepository {
    async fn append(&self, record: &AttemptRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO login_attempts (
                attempt_id,
                identity,
                source_ip,
                user_agent,
                attempted_at,
                outcome
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.attempt_id.as_uuid())
        .bind(record.identity.as_str())
        .bind(non_empty(&record.source_ip))
        .bind(non_empty(&record.user_agent))
        .bind(record.attempted_at)
        .bind(record.outcome.id())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_since(
        &self,
        identity: &LoginIdentity,
        after: DateTime<Utc>,
    ) -> AuthResult<Vec<AttemptRecord>> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT
                attempt_id,
                identity,
                source_ip,
                user_agent,
                attempted_at,
                outcome
            FROM login_attempts
            WHERE identity = $1 AND attempted_at > $2
            ORDER BY attempted_at ASC
            "#,
        )
        .bind(identity.as_str())
        .bind(after)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttemptRow::into_record).collect()
    }

    async fn find_counted_since(
        &self,
        identity: &LoginIdentity,
        after: DateTime<Utc>,
    ) -> AuthResult<Vec<AttemptRecord>> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT
                attempt_id,
                identity,
                source_ip,
                user_agent,
                attempted_at,
                outcome
            FROM login_attempts
            WHERE identity = $1 AND attempted_at > $2 AND outcome <> $3
            ORDER BY attempted_at ASC
            "#,
        )
        .bind(identity.as_str())
        .bind(after)
        .bind(AttemptOutcome::Locked.id())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttemptRow::into_record).collect()
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM login_attempts WHERE attempted_at <= $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(attempts_deleted = deleted, "Purged old login attempts");

        Ok(deleted)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

// ============================================================================
// Auth Token Repository Implementation
// ============================================================================

impl AuthTokenRepository for PgAuthRepository {
    async fn issue(&self, token: &AuthToken) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE auth_tokens SET used_at = $3
            WHERE account_id = $1 AND purpose = $2 AND used_at IS NULL
            "#,
        )
        .bind(token.account_id.as_uuid())
        .bind(token.purpose.id())
        .bind(token.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO auth_tokens (
                token_id,
                account_id,
                purpose,
                token_hash,
                created_at,
                expires_at,
                used_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.token_id.as_uuid())
        .bind(token.account_id.as_uuid())
        .bind(token.purpose.id())
        .bind(token.token_hash.as_slice())
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.used_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn consume(
        &self,
        token_hash: &[u8; 32],
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<AuthToken>> {
        let sql = format!(
            r#"
            UPDATE auth_tokens SET used_at = $3
            WHERE token_hash = $1
              AND purpose = $2
              AND used_at IS NULL
              AND expires_at > $3
            RETURNING {TOKEN_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, TokenRow>(&sql)
            .bind(token_hash.as_slice())
            .bind(purpose.id())
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TokenRow::into_token).transpose()
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(tokens_deleted = deleted, "Purged expired auth tokens");

        Ok(deleted)
    }
}

// ============================================================================
// Auth Session Repository Implementation
// ============================================================================

impl AuthSessionRepository for PgAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                account_id,
                public_id,
                user_role,
                expires_at_ms,
                remember_me,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(session.session_id)
        .bind(session.account_id.as_uuid())
        .bind(session.public_id.as_str())
        .bind(session.role.id())
        .bind(session.expires_at_ms)
        .bind(session.remember_me)
        .bind(&session.client_fingerprint_hash)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let now_ms = Utc::now().timestamp_millis();

        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM auth_sessions WHERE session_id = $1 AND expires_at_ms > $2"
        );
        let row = sqlx::query_as::<_, AuthSessionRow>(&sql)
            .bind(session_id)
            .bind(now_ms)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) if r.client_fingerprint_hash != fingerprint_hash => {
                tracing::warn!(session_id = %session_id, "Auth session fingerprint mismatch");
                Ok(None)
            }
            Some(r) => Ok(Some(r.into_session()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_sessions SET
                expires_at_ms = $2,
                last_activity_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id)
        .bind(session.expires_at_ms)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_all_for_account(
        &self,
        account_id: &AccountId,
        except: Option<Uuid>,
    ) -> AuthResult<u64> {
        let deleted = match except {
            Some(except_id) => {
                sqlx::query("DELETE FROM auth_sessions WHERE account_id = $1 AND session_id != $2")
                    .bind(account_id.as_uuid())
                    .bind(except_id)
                    .execute(&self.pool)
                    .await?
                    .rows_affected()
            }
            None => sqlx::query("DELETE FROM auth_sessions WHERE account_id = $1")
                .bind(account_id.as_uuid())
                .execute(&self.pool)
                .await?
                .rows_affected(),
        };

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        self.cleanup_expired().await
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

fn parse_public_id(value: &str) -> AuthResult<PublicId> {
    PublicId::parse_str(value)
        .ok_or_else(|| AuthError::Internal(format!("Invalid public_id: {value}")))
}

fn parse_role(id: i16) -> AuthResult<UserRole> {
    UserRole::from_id(id).ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {id}")))
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    public_id: String,
    user_name: String,
    email: String,
    user_role: i16,
    account_status: i16,
    email_verified: bool,
    last_seen_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let status = AccountStatus::from_id(self.account_status).ok_or_else(|| {
            AuthError::Internal(format!("Invalid account_status: {}", self.account_status))
        })?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            public_id: parse_public_id(&self.public_id)?,
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            role: parse_role(self.user_role)?,
            status,
            email_verified: self.email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_seen_at: self.last_seen_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    account_id: Uuid,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CredentialRow {
    fn into_credential(self) -> AuthResult<Credential> {
        Ok(Credential {
            account_id: AccountId::from_uuid(self.account_id),
            password_hash: UserPassword::from_phc_string(self.password_hash)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AttemptRow {
    attempt_id: Uuid,
    identity: String,
    source_ip: Option<String>,
    user_agent: Option<String>,
    attempted_at: DateTime<Utc>,
    outcome: i16,
}

impl AttemptRow {
    fn into_record(self) -> AuthResult<AttemptRecord> {
        let outcome = AttemptOutcome::from_id(self.outcome)
            .ok_or_else(|| AuthError::Internal(format!("Invalid outcome: {}", self.outcome)))?;

        Ok(AttemptRecord {
            attempt_id: AttemptId::from_uuid(self.attempt_id),
            identity: LoginIdentity::from_db(self.identity),
            source_ip: self.source_ip.unwrap_or_default(),
            user_agent: self.user_agent.unwrap_or_default(),
            attempted_at: self.attempted_at,
            outcome,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    token_id: Uuid,
    account_id: Uuid,
    purpose: i16,
    token_hash: Vec<u8>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

impl TokenRow {
    fn into_token(self) -> AuthResult<AuthToken> {
        let purpose = TokenPurpose::from_id(self.purpose)
            .ok_or_else(|| AuthError::Internal(format!("Invalid purpose: {}", self.purpose)))?;
        let token_hash = <[u8; 32]>::try_from(self.token_hash.as_slice())
            .map_err(|_| AuthError::Internal("Invalid token_hash length".to_string()))?;

        Ok(AuthToken {
            token_id: TokenId::from_uuid(self.token_id),
            account_id: AccountId::from_uuid(self.account_id),
            purpose,
            token_hash,
            created_at: self.created_at,
            expires_at: self.expires_at,
            used_at: self.used_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    account_id: Uuid,
    public_id: String,
    user_role: i16,
    expires_at_ms: i64,
    remember_me: bool,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthResult<AuthSession> {
        Ok(AuthSession {
            session_id: self.session_id,
            account_id: AccountId::from_uuid(self.account_id),
            public_id: parse_public_id(&self.public_id)?,
            role: parse_role(self.user_role)?,
            expires_at_ms: self.expires_at_ms,
            remember_me: self.remember_me,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        })
    }
}
