//! Auth Session Entity
//!
//! Server-side login session. The cookie only carries a signed reference
//! to `session_id`.

use chrono::{DateTime, Duration, Utc};
use platform::client::ClientContext;
use uuid::Uuid;

use crate::domain::entity::principal::Principal;
use crate::domain::value_object::{account_id::AccountId, public_id::PublicId, user_role::UserRole};

/// Auth session entity
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session ID (UUID v4)
    pub session_id: Uuid,
    pub account_id: AccountId,
    /// Public ID for API responses
    pub public_id: PublicId,
    /// Role at session creation; admin actions re-check storage
    pub role: UserRole,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Whether "Remember Me" was checked
    pub remember_me: bool,
    /// SHA-256 of the User-Agent the session was created with
    pub client_fingerprint_hash: Vec<u8>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    /// Create a new auth session
    ///
    /// TTL is chosen by the caller from config.
    pub fn new(principal: &Principal, remember_me: bool, client: &ClientContext, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            account_id: principal.account_id,
            public_id: principal.public_id,
            role: principal.role,
            expires_at_ms: (now + ttl).timestamp_millis(),
            remember_me,
            client_fingerprint_hash: client.fingerprint_vec(),
            client_ip: client.ip.map(|ip| ip.to_string()),
            user_agent: (!client.user_agent.is_empty()).then(|| client.user_agent.clone()),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Get remaining time until expiration
    pub fn remaining_ms(&self) -> i64 {
        let now_ms = Utc::now().timestamp_millis();
        (self.expires_at_ms - now_ms).max(0)
    }

    /// Extend a remember-me session to `now + ttl_long` once less than half
    /// of `ttl_long` remains
    pub fn extend_if_needed(&mut self, ttl_long: Duration) -> bool {
        if !self.remember_me {
            return false;
        }

        let now = Utc::now();
        if self.expires_at_ms < (now + (ttl_long / 2)).timestamp_millis() {
            self.expires_at_ms = (now + ttl_long).timestamp_millis();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_name::UserName;

    fn principal() -> Principal {
        Principal {
            account_id: AccountId::new(),
            public_id: PublicId::new(),
            user_name: UserName::new("alice").unwrap(),
            role: UserRole::Member,
        }
    }

    fn client() -> ClientContext {
        ClientContext::new(Some("127.0.0.1".parse().unwrap()), "test-agent")
    }

    #[test]
    fn test_new_session_binds_client() {
        let session = AuthSession::new(&principal(), false, &client(), Duration::hours(12));
        assert!(!session.is_expired());
        assert_eq!(session.client_fingerprint_hash, client().fingerprint_vec());
        assert_eq!(session.client_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(session.user_agent.as_deref(), Some("test-agent"));
        assert!(session.remaining_ms() > 0);
    }

    #[test]
    fn test_expired_session() {
        let session = AuthSession::new(&principal(), false, &client(), Duration::hours(-1));
        assert!(session.is_expired());
        assert_eq!(session.remaining_ms(), 0);
    }

    #[test]
    fn test_extend_only_remember_me() {
        let ttl_long = Duration::days(7);

        let mut short = AuthSession::new(&principal(), false, &client(), Duration::hours(1));
        assert!(!short.extend_if_needed(ttl_long));

        let mut long = AuthSession::new(&principal(), true, &client(), Duration::days(1));
        assert!(long.extend_if_needed(ttl_long));
        assert!(long.remaining_ms() > Duration::days(6).num_milliseconds());

        // Fresh long session is not extended again
        assert!(!long.extend_if_needed(ttl_long));
    }
}
