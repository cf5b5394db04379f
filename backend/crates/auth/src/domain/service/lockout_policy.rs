//! Lockout Policy
//!
//! Pure decision over the recent attempt log of one identity. The caller
//! loads the records and consults the policy before any credential check.
//!
//! ## Window
//! Sliding, not bucketed: a record counts only when
//! `now - window < attempted_at`. A record exactly at the boundary is out.
//!
//! ## Counting
//! - Only `Failure` outcomes count. `Locked` denials are logged for audit
//!   but never extend a lockout.
//! - With `reset_on_success`, only failures strictly after the latest
//!   success in the window count. Without it, a success changes nothing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use platform::rate_limit::RateLimitConfig;

use crate::domain::entity::attempt_record::AttemptRecord;
use crate::domain::value_object::attempt_outcome::AttemptOutcome;

/// Default failures allowed in the window
pub const DEFAULT_THRESHOLD: u32 = 5;

/// Default trailing window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3600);

/// Which attempts of an identity are counted together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockoutScope {
    /// All attempts for the identity, from any source
    #[default]
    Identity,
    /// Only attempts for the identity from the requesting source address
    IdentityAndSource,
}

impl LockoutScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" => Some(Self::Identity),
            "identity_and_source" => Some(Self::IdentityAndSource),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutDecision {
    Allow {
        failures: u32,
    },
    Deny {
        failures: u32,
        /// Until the oldest failure that keeps the lockout leaves the window
        retry_after: Duration,
    },
}

impl LockoutDecision {
    #[inline]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }

    #[inline]
    pub fn failures(&self) -> u32 {
        match self {
            Self::Allow { failures } | Self::Deny { failures, .. } => *failures,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub threshold: u32,
    pub window: Duration,
    pub reset_on_success: bool,
    pub scope: LockoutScope,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            window: DEFAULT_WINDOW,
            reset_on_success: false,
            scope: LockoutScope::Identity,
        }
    }
}

impl LockoutPolicy {
    fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.threshold,
            window: self.window,
        }
    }

    /// Exclusive lower bound of the window ending at `now`
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let start_ms = self.rate_limit().window_start_ms(now.timestamp_millis());
        DateTime::from_timestamp_millis(start_ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Decide whether an attempt from `source_ip` may proceed
    ///
    /// `records` are the identity's attempts; order does not matter and
    /// records outside the window are ignored.
    pub fn evaluate(
        &self,
        records: &[AttemptRecord],
        source_ip: &str,
        now: DateTime<Utc>,
    ) -> LockoutDecision {
        let now_ms = now.timestamp_millis();
        let window_start_ms = self.rate_limit().window_start_ms(now_ms);

        let in_scope = records.iter().filter(|r| match self.scope {
            LockoutScope::Identity => true,
            LockoutScope::IdentityAndSource => r.source_ip == source_ip,
        });

        let counted_after_ms = if self.reset_on_success {
            in_scope
                .clone()
                .filter(|r| r.outcome.is_success())
                .map(AttemptRecord::attempted_at_ms)
                .filter(|&ts| ts > window_start_ms)
                .max()
        } else {
            None
        };

        let failures = in_scope
            .filter(|r| r.outcome == AttemptOutcome::Failure)
            .map(AttemptRecord::attempted_at_ms)
            .filter(|&ts| counted_after_ms.is_none_or(|success| ts > success));

        let result = self.rate_limit().evaluate(now_ms, failures);

        if result.allowed {
            LockoutDecision::Allow {
                failures: result.count,
            }
        } else {
            let retry_ms = u64::try_from(result.retry_after_ms(now_ms)).unwrap_or(0);
            LockoutDecision::Deny {
                failures: result.count,
                retry_after: Duration::from_millis(retry_ms),
            }
        }
    }
}
