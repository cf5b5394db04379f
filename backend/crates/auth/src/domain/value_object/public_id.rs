//! PublicId Value Object
//!
//! Account identifier exposed in URLs and API responses. Wraps a Nanoid
//! for compact, URL-safe IDs; the internal UUID never leaves the server.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::public_id::PublicId;
//!
//! let public_id = PublicId::new();
//! assert_eq!(public_id.as_str().len(), 21);
//! assert_eq!(PublicId::parse_str(public_id.as_str()), Some(public_id));
//! ```
use std::str::FromStr;

use nid::Nanoid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicId(Nanoid);

impl PublicId {
    #[inline]
    pub fn new() -> Self {
        Self(Nanoid::new())
    }

    /// Parse a path segment; `None` for anything that is not a Nanoid
    #[inline]
    pub fn parse_str(s: &str) -> Option<Self> {
        Nanoid::from_str(s).ok().map(PublicId)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PublicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_new_is_unique() {
        assert_ne!(PublicId::new(), PublicId::new());
    }

    #[test]
    fn test_public_id_parse_str() {
        let id_str = "0123456789abcdefghi01";
        let public_id = PublicId::parse_str(id_str).unwrap();
        assert_eq!(public_id.as_str(), id_str);
        assert_eq!(public_id.to_string(), id_str);
    }

    #[test]
    fn test_public_id_parse_str_invalid() {
        assert!(PublicId::parse_str("invalid_id!@#").is_none());
        assert!(PublicId::parse_str("short").is_none());
    }
}
