//! Auth Token Entity
//!
//! Single-use, time-bounded secret tied to one account. Only the SHA-256
//! of the secret is stored; the plaintext is shown once at issue.

use chrono::{DateTime, Duration, Utc};
use platform::crypto::{random_token, sha256};

use crate::domain::value_object::{
    account_id::{AccountId, TokenId},
    token_purpose::TokenPurpose,
};

/// Random bytes per token secret
const TOKEN_ENTROPY_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct AuthToken {
    pub token_id: TokenId,
    pub account_id: AccountId,
    pub purpose: TokenPurpose,
    pub token_hash: [u8; 32],
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    /// Create a token and return it together with its plaintext secret
    pub fn issue(account_id: AccountId, purpose: TokenPurpose, ttl: Duration) -> (Self, String) {
        let secret = random_token(TOKEN_ENTROPY_BYTES);
        let now = Utc::now();
        let token = Self {
            token_id: TokenId::new(),
            account_id,
            purpose,
            token_hash: Self::hash_secret(&secret),
            created_at: now,
            expires_at: now + ttl,
            used_at: None,
        };
        (token, secret)
    }

    pub fn hash_secret(secret: &str) -> [u8; 32] {
        sha256(secret.trim().as_bytes())
    }

    /// Unused and not yet expired
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }
}
