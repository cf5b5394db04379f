//! User Name Value Object
//!
//! ユーザー名は、フォーラム上でユーザーを識別する**公開ハンドル**。
//! ログイン、画面表示、ユーザー一覧に使用される。
//!
//! ## 設計方針
//! - 許可文字: ASCII英数字と `@#&%!`
//! - 大文字入力は受け付けるが、canonical（正規形）は小文字
//! - NFKC正規化 → trim → 検証 → 小文字化 の順で処理
//!
//! ## 不変条件
//! - 長さ: 3〜40文字（正規化後）
//! - canonical はストレージ層で一意（`UNIQUE` 制約）

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Constants
// ============================================================================

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 40;

/// Symbols allowed in user names besides ASCII letters and digits
const ALLOWED_SPECIAL_CHARS: &[char] = &['@', '#', '&', '%', '!'];

// ============================================================================
// Error Types
// ============================================================================

/// Error returned when user name validation fails
///
/// `Display` output is shown to the user as a field error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty after normalization
    Empty,

    /// Length outside USER_NAME_MIN_LENGTH..=USER_NAME_MAX_LENGTH
    Length { length: usize },

    /// User name contains a character outside the allowed set
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Username is required"),
            Self::Length { .. } => write!(
                f,
                "Username must be between {USER_NAME_MIN_LENGTH}-{USER_NAME_MAX_LENGTH} characters"
            ),
            Self::InvalidCharacter { .. } => write!(
                f,
                "Username can only contain letters, numbers, and @#&%! characters"
            ),
        }
    }
}

impl std::error::Error for UserNameError {}

// ============================================================================
// UserName Value Object
// ============================================================================

/// Validated, normalized user name
///
/// # Storage
/// - `original`: The user's input (trimmed, NFKC normalized, preserves case)
/// - `canonical`: Lowercase form for uniqueness checks and login lookup
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Create a new UserName from raw input
    ///
    /// Applies normalization (NFKC, trim) and validates.
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = normalize(input.as_ref());
        Self::validate(&original)?;
        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Get the original user name (preserves case)
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Get the canonical (normalized, lowercase) user name
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Create from database values (assumes already validated)
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        let canonical = original.to_lowercase();
        Self {
            original,
            canonical,
        }
    }

    fn validate(name: &str) -> Result<(), UserNameError> {
        if name.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = name.chars().count();
        if !(USER_NAME_MIN_LENGTH..=USER_NAME_MAX_LENGTH).contains(&length) {
            return Err(UserNameError::Length { length });
        }

        if let Some((position, char)) = name.chars().enumerate().find(|(_, c)| !is_valid_char(*c))
        {
            return Err(UserNameError::InvalidCharacter { char, position });
        }

        Ok(())
    }
}

/// Trim and NFKC-normalize, preserving case
pub(crate) fn normalize(input: &str) -> String {
    input.nfkc().collect::<String>().trim().to_string()
}

#[inline]
fn is_valid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c)
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserName")
            .field("original", &self.original)
            .field("canonical", &self.canonical)
            .finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod normalization {
        use super::*;

        #[test]
        fn test_trim_whitespace() {
            let name = UserName::new("  alice  ").unwrap();
            assert_eq!(name.original(), "alice");
        }

        #[test]
        fn test_case_preserved_in_original() {
            let name = UserName::new("AlIcE").unwrap();
            assert_eq!(name.original(), "AlIcE");
            assert_eq!(name.canonical(), "alice");
        }

        #[test]
        fn test_nfkc_normalization() {
            // Full-width 'Ａ' (U+FF21) becomes ASCII 'A'
            let name = UserName::new("Ａlice").unwrap();
            assert_eq!(name.original(), "Alice");
            assert_eq!(name.canonical(), "alice");
        }

        #[test]
        fn test_from_db_derives_canonical() {
            let name = UserName::from_db("Admin");
            assert_eq!(name.canonical(), "admin");
        }
    }

    mod length_validation {
        use super::*;

        #[test]
        fn test_empty_fails() {
            assert_eq!(UserName::new(""), Err(UserNameError::Empty));
            assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
        }

        #[test]
        fn test_too_short() {
            assert_eq!(UserName::new("ad"), Err(UserNameError::Length { length: 2 }));
        }

        #[test]
        fn test_bounds_inclusive() {
            assert!(UserName::new("abc").is_ok());
            assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        }

        #[test]
        fn test_too_long() {
            let input = "a".repeat(USER_NAME_MAX_LENGTH + 1);
            assert!(matches!(
                UserName::new(&input),
                Err(UserNameError::Length { length: 41 })
            ));
        }

        #[test]
        fn test_length_message() {
            let err = UserName::new("ad").unwrap_err();
            assert_eq!(err.to_string(), "Username must be between 3-40 characters");
        }
    }

    mod character_validation {
        use super::*;

        #[test]
        fn test_allowed_symbols() {
            assert!(UserName::new("user@name").is_ok());
            assert!(UserName::new("user#1").is_ok());
            assert!(UserName::new("a&b%c!").is_ok());
        }

        #[test]
        fn test_rejected_characters() {
            for input in ["user_name", "user.name", "user name", "ユーザー", "semi;colon"] {
                assert!(
                    matches!(
                        UserName::new(input),
                        Err(UserNameError::InvalidCharacter { .. })
                    ),
                    "{input} should be rejected"
                );
            }
        }

        #[test]
        fn test_reports_first_offending_position() {
            assert_eq!(
                UserName::new("abc-d_e"),
                Err(UserNameError::InvalidCharacter {
                    char: '-',
                    position: 3
                })
            );
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_deserialize_validates() {
            let ok: Result<UserName, _> = serde_json::from_str("\"Alice\"");
            assert!(ok.is_ok());
            let bad: Result<UserName, _> = serde_json::from_str("\"a b\"");
            assert!(bad.is_err());
        }

        #[test]
        fn test_serialize_original() {
            let name = UserName::new("Alice").unwrap();
            assert_eq!(serde_json::to_string(&name).unwrap(), "\"Alice\"");
        }
    }
}
