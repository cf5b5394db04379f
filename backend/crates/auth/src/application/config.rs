//! Application Configuration
//!
//! Configuration for the Auth application layer, read from the
//! environment by the binary.
//!
//! | variable | default |
//! |---|---|
//! | `AUTH_SESSION_SECRET` | random in debug builds, required otherwise (base64, 32 bytes) |
//! | `AUTH_PASSWORD_PEPPER` | none |
//! | `AUTH_COOKIE_SECURE` | `true` |
//! | `AUTH_COOKIE_SAME_SITE` | `lax` |
//! | `AUTH_TRUST_FORWARDED_FOR` | `false` |
//! | `AUTH_LOCKOUT_THRESHOLD` | `5` |
//! | `AUTH_LOCKOUT_WINDOW_SECS` | `3600` |
//! | `AUTH_LOCKOUT_RESET_ON_SUCCESS` | `false` |
//! | `AUTH_LOCKOUT_SCOPE` | `identity` (or `identity_and_source`) |
//! | `AUTH_ATTEMPT_RETENTION_DAYS` | `30` |
//! | `AUTH_TOKEN_TTL_HOURS` | `24` |
//! | `AUTH_BOOTSTRAP_ADMINS` | empty (comma-separated user names) |

use std::str::FromStr;
use std::time::Duration;

use platform::cookie::CookieConfig;
use thiserror::Error;

use crate::domain::service::lockout_policy::{LockoutPolicy, LockoutScope};

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required in release builds")]
    Missing { key: &'static str },

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Session TTL without "Remember Me" (12 hours)
    pub session_ttl_short: Duration,
    /// Session TTL with "Remember Me" (1 week)
    pub session_ttl_long: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Read the client address from `X-Forwarded-For`
    pub trust_forwarded_for: bool,
    /// Login lockout rules
    pub lockout: LockoutPolicy,
    /// How long attempt records are kept for audit
    pub attempt_retention: Duration,
    /// Lifetime of password-reset and verification tokens
    pub token_ttl: Duration,
    /// Canonical user names that register as administrators
    pub bootstrap_admins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "auth_session".to_string(),
            session_secret: [0u8; 32],
            session_ttl_short: Duration::from_secs(12 * 3600), // 12 hours
            session_ttl_long: Duration::from_secs(7 * 24 * 3600), // 1 week
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            trust_forwarded_for: false,
            lockout: LockoutPolicy::default(),
            attempt_retention: Duration::from_secs(30 * 24 * 3600),
            token_ttl: Duration::from_secs(24 * 3600),
            bootstrap_admins: Vec::new(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_cookie_name", &self.session_cookie_name)
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl_short", &self.session_ttl_short)
            .field("session_ttl_long", &self.session_ttl_long)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .field("lockout", &self.lockout)
            .field("attempt_retention", &self.attempt_retention)
            .field("token_ttl", &self.token_ttl)
            .field("bootstrap_admins", &self.bootstrap_admins)
            .finish()
    }
}

impl AuthConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.session_secret = match get("AUTH_SESSION_SECRET") {
            Some(encoded) => decode_secret(&encoded)?,
            None if cfg!(debug_assertions) => {
                tracing::warn!("AUTH_SESSION_SECRET not set, using a random secret");
                Self::with_random_secret().session_secret
            }
            None => {
                return Err(ConfigError::Missing {
                    key: "AUTH_SESSION_SECRET",
                });
            }
        };

        config.password_pepper = get("AUTH_PASSWORD_PEPPER").map(String::into_bytes);

        if let Some(v) = get("AUTH_COOKIE_SECURE") {
            config.cookie_secure = parse_bool("AUTH_COOKIE_SECURE", &v)?;
        }
        if let Some(v) = get("AUTH_COOKIE_SAME_SITE") {
            config.cookie_same_site = SameSite::parse(&v).ok_or_else(|| ConfigError::Invalid {
                key: "AUTH_COOKIE_SAME_SITE",
                reason: format!("unknown policy '{v}'"),
            })?;
        }
        if let Some(v) = get("AUTH_TRUST_FORWARDED_FOR") {
            config.trust_forwarded_for = parse_bool("AUTH_TRUST_FORWARDED_FOR", &v)?;
        }

        if let Some(v) = get("AUTH_LOCKOUT_THRESHOLD") {
            let threshold: u32 = parse_number("AUTH_LOCKOUT_THRESHOLD", &v)?;
            if threshold == 0 {
                return Err(ConfigError::Invalid {
                    key: "AUTH_LOCKOUT_THRESHOLD",
                    reason: "must be at least 1".to_string(),
                });
            }
            config.lockout.threshold = threshold;
        }
        if let Some(v) = get("AUTH_LOCKOUT_WINDOW_SECS") {
            config.lockout.window =
                Duration::from_secs(parse_number("AUTH_LOCKOUT_WINDOW_SECS", &v)?);
        }
        if let Some(v) = get("AUTH_LOCKOUT_RESET_ON_SUCCESS") {
            config.lockout.reset_on_success = parse_bool("AUTH_LOCKOUT_RESET_ON_SUCCESS", &v)?;
        }
        if let Some(v) = get("AUTH_LOCKOUT_SCOPE") {
            config.lockout.scope = LockoutScope::parse(&v).ok_or_else(|| ConfigError::Invalid {
                key: "AUTH_LOCKOUT_SCOPE",
                reason: format!("unknown scope '{v}'"),
            })?;
        }

        if let Some(v) = get("AUTH_ATTEMPT_RETENTION_DAYS") {
            let days: u64 = parse_number("AUTH_ATTEMPT_RETENTION_DAYS", &v)?;
            config.attempt_retention = Duration::from_secs(days.saturating_mul(24 * 3600));
        }
        if let Some(v) = get("AUTH_TOKEN_TTL_HOURS") {
            let hours: u64 = parse_number("AUTH_TOKEN_TTL_HOURS", &v)?;
            config.token_ttl = Duration::from_secs(hours.saturating_mul(3600));
        }

        if let Some(v) = get("AUTH_BOOTSTRAP_ADMINS") {
            config.bootstrap_admins = v
                .split(',')
                .map(|name| name.trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect();
        }

        Ok(config)
    }

    /// Whether a newly registered user name gets administrator rights
    pub fn is_bootstrap_admin(&self, canonical_user_name: &str) -> bool {
        self.bootstrap_admins
            .iter()
            .any(|name| name == canonical_user_name)
    }

    /// Session cookie settings
    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
        }
    }

    /// Session TTL for the given remember-me choice
    pub fn session_ttl(&self, remember_me: bool) -> chrono::Duration {
        let ttl = if remember_me {
            self.session_ttl_long
        } else {
            self.session_ttl_short
        };
        chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(12))
    }

    pub fn session_ttl_long_chrono(&self) -> chrono::Duration {
        self.session_ttl(true)
    }

    pub fn token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.token_ttl).unwrap_or(chrono::Duration::hours(24))
    }

    pub fn attempt_retention_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.attempt_retention).unwrap_or(chrono::Duration::days(30))
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

fn decode_secret(encoded: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = platform::crypto::from_base64(encoded.trim()).map_err(|e| ConfigError::Invalid {
        key: "AUTH_SESSION_SECRET",
        reason: e.to_string(),
    })?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| ConfigError::Invalid {
        key: "AUTH_SESSION_SECRET",
        reason: format!("expected 32 bytes, got {}", bytes.len()),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
