//! Email Value Object
//!
//! Represents a validated, lowercased email address.
//! Basic syntax validation only; ownership is confirmed with an
//! email-verification token.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Maximum email length in characters
pub const EMAIL_MAX_LENGTH: usize = 120;

/// Symbols allowed in the local part besides ASCII letters and digits
const LOCAL_SPECIAL_CHARS: &[char] = &['.', '_', '%', '+', '-'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Email must be less than 120 characters")]
    TooLong,

    #[error("Invalid email format")]
    InvalidFormat,
}

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let email = email.as_ref().trim().to_lowercase();

        if email.is_empty() {
            return Err(EmailError::Empty);
        }

        if email.chars().count() > EMAIL_MAX_LENGTH {
            return Err(EmailError::TooLong);
        }

        if !Self::is_valid_format(&email) {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(email))
    }

    /// `local@domain.tld`
    ///
    /// - local: one or more of `[a-z0-9._%+-]`
    /// - domain: one or more of `[a-z0-9.-]`, then a dot
    /// - tld: at least two ASCII letters
    fn is_valid_format(email: &str) -> bool {
        let Some((local, host)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty()
            || !local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIAL_CHARS.contains(&c))
        {
            return false;
        }

        // The last dot separates the TLD
        let Some((domain, tld)) = host.rsplit_once('.') else {
            return false;
        };

        if domain.is_empty()
            || !domain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the domain part of the email
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, d)| d)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
