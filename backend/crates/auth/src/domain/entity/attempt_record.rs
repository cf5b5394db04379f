//! Attempt Record Entity
//!
//! One row of the append-only attempt log. Written once per
//! authentication call and never updated.

use chrono::{DateTime, Utc};
use platform::client::ClientContext;

use crate::domain::value_object::{
    account_id::AttemptId, attempt_outcome::AttemptOutcome, login_identity::LoginIdentity,
};

#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub attempt_id: AttemptId,
    /// Canonical identity as presented; need not match an account
    pub identity: LoginIdentity,
    /// Source address, empty when unknown
    pub source_ip: String,
    pub user_agent: String,
    pub attempted_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
}

impl AttemptRecord {
    pub fn new(
        identity: LoginIdentity,
        client: &ClientContext,
        outcome: AttemptOutcome,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            attempt_id: AttemptId::new(),
            identity,
            source_ip: client.ip_string(),
            user_agent: client.user_agent.clone(),
            attempted_at,
            outcome,
        }
    }

    #[inline]
    pub fn attempted_at_ms(&self) -> i64 {
        self.attempted_at.timestamp_millis()
    }
}
