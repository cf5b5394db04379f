//! Login Identity Value Object
//!
//! The user name or email presented at login, in the canonical form used
//! both for account lookup and as the attempt-log key. No format rules are
//! applied: an identity that could never register is still counted.

use std::fmt;

use super::email::Email;
use super::user_name::normalize;

/// Stored identities are cut to this many characters
pub const LOGIN_IDENTITY_MAX_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginIdentity(String);

impl LoginIdentity {
    /// Canonicalize raw input (NFKC, trim, lowercase)
    ///
    /// Returns `None` when nothing is left after trimming.
    pub fn new(input: impl AsRef<str>) -> Option<Self> {
        let canonical: String = normalize(input.as_ref())
            .to_lowercase()
            .chars()
            .take(LOGIN_IDENTITY_MAX_LENGTH)
            .collect();
        (!canonical.is_empty()).then_some(Self(canonical))
    }

    /// Rebuild from the attempt log (already canonical)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identity read as an email address, if it is one
    pub fn as_email(&self) -> Option<Email> {
        Email::new(&self.0).ok()
    }
}

impl fmt::Display for LoginIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LoginIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        let identity = LoginIdentity::new("  Admin ").unwrap();
        assert_eq!(identity.as_str(), "admin");
        assert_eq!(LoginIdentity::new("ＡＤＭＩＮ").unwrap(), identity);
    }

    #[test]
    fn test_blank_is_none() {
        assert!(LoginIdentity::new("").is_none());
        assert!(LoginIdentity::new("  \t ").is_none());
    }

    #[test]
    fn test_invalid_shapes_are_kept() {
        // Never registrable, still a distinct lockout key
        let identity = LoginIdentity::new("no spaces allowed").unwrap();
        assert_eq!(identity.as_str(), "no spaces allowed");
    }

    #[test]
    fn test_as_email() {
        assert!(LoginIdentity::new("User@Example.com").unwrap().as_email().is_some());
        assert!(LoginIdentity::new("user@name").unwrap().as_email().is_none());
        assert!(LoginIdentity::new("alice").unwrap().as_email().is_none());
    }

    #[test]
    fn test_truncation() {
        let identity = LoginIdentity::new("x".repeat(1000)).unwrap();
        assert_eq!(identity.as_str().len(), LOGIN_IDENTITY_MAX_LENGTH);
    }
}
