//! Field Errors - Per-field validation failures
//!
//! Defines [`FieldError`] and the [`FieldErrors`] collector used by
//! form-style validation that reports every failing field at once.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

/// 単一フィールドの検証エラー
///
/// ## Fields
/// * `field` - 入力フィールド名（API の JSON キーと一致）
/// * `message` - ユーザー向けのエラーメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Cow<'static, str>,
    pub message: Cow<'static, str>,
}

impl FieldError {
    #[inline]
    pub fn new(field: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// フィールドエラーの集合
///
/// 検証を途中で打ち切らず、すべてのエラーを収集するために使用します。
///
/// ## Examples
/// ```rust
/// use kernel::error::field::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.push("user_name", "Username is required");
/// assert!(!errors.is_empty());
/// assert!(errors.has("user_name"));
/// assert!(errors.into_result().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// エラーを追加
    pub fn push(
        &mut self,
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) {
        self.0.push(FieldError::new(field, message));
    }

    /// `Result` のエラーを指定フィールドに記録し、成功値を返す
    pub fn capture<T, E: fmt::Display>(
        &mut self,
        field: &'static str,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(field, e.to_string());
                None
            }
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 指定フィールドにエラーがあるか
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// エラーがなければ `Ok(())`、あれば `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FieldError> for FieldErrors {
    fn from(err: FieldError) -> Self {
        Self(vec![err])
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all_errors() {
        let mut errors = FieldErrors::new();
        errors.push("user_name", "too short");
        errors.push("password", "too short");
        assert_eq!(errors.len(), 2);
        assert!(errors.has("user_name"));
        assert!(errors.has("password"));
        assert!(!errors.has("email"));
    }

    #[test]
    fn test_capture() {
        let mut errors = FieldErrors::new();
        let ok: Result<i32, String> = Ok(1);
        let err: Result<i32, String> = Err("bad".to_string());

        assert_eq!(errors.capture("a", ok), Some(1));
        assert_eq!(errors.capture("b", err), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().unwrap().message, "bad");
    }

    #[test]
    fn test_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());
        let single: FieldErrors = FieldError::new("email", "Invalid email format").into();
        assert!(single.into_result().is_err());
    }

    #[test]
    fn test_display_joins_fields() {
        let mut errors = FieldErrors::new();
        errors.push("a", "x");
        errors.push("b", "y");
        assert_eq!(errors.to_string(), "a: x; b: y");
    }

    #[test]
    fn test_serializes_as_list() {
        let mut errors = FieldErrors::new();
        errors.push("email", "already taken");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "field": "email", "message": "already taken" }])
        );
    }
}
