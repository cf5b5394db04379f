//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{
    app_error::AppError,
    field::{FieldError, FieldErrors},
    kind::ErrorKind,
};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Shown for wrong password, unknown identity, inactive account and lockout
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

pub const USER_NAME_TAKEN_MESSAGE: &str = "Username is already taken";

pub const EMAIL_TAKEN_MESSAGE: &str = "An account already exists with this email";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more input fields failed validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// User name already registered (canonical form)
    #[error("Username is already taken")]
    UserNameTaken,

    /// Email already registered
    #[error("An account already exists with this email")]
    EmailTaken,

    /// Any login failure, including lockout
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Session missing, expired, forged or bound to another client
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Actor lacks administrator rights
    #[error("Access denied")]
    Forbidden,

    /// Target account does not exist
    #[error("User not found")]
    AccountNotFound,

    /// Administrator tried to toggle their own account
    #[error("{0}")]
    SelfModification(&'static str),

    /// Unknown, used, expired or wrong-purpose auth token
    #[error("Invalid or expired token")]
    TokenInvalid,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Single-field validation failure
    pub fn field(field: &'static str, message: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        AuthError::Validation(errors)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::UserNameTaken | AuthError::EmailTaken => {
                ErrorKind::UnprocessableEntity
            }
            AuthError::InvalidCredentials | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::SelfModification(_) => ErrorKind::Conflict,
            AuthError::TokenInvalid => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details stay out of the message.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(fields) => AppError::from(fields.clone()),
            AuthError::UserNameTaken => AppError::from(FieldErrors::from(FieldError::new(
                "user_name",
                USER_NAME_TAKEN_MESSAGE,
            ))),
            AuthError::EmailTaken => {
                AppError::from(FieldErrors::from(FieldError::new("email", EMAIL_TAKEN_MESSAGE)))
            }
            AuthError::InvalidCredentials => AppError::unauthorized(INVALID_CREDENTIALS_MESSAGE),
            AuthError::SessionInvalid => {
                AppError::unauthorized("Authentication required").with_action("Please log in")
            }
            AuthError::Forbidden => AppError::forbidden("Access denied"),
            AuthError::AccountNotFound => AppError::not_found("User not found"),
            AuthError::SelfModification(message) => AppError::conflict(*message),
            AuthError::TokenInvalid => AppError::bad_request("Invalid or expired token"),
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Rejected login attempt");
            }
            AuthError::Forbidden => {
                tracing::warn!("Non-admin attempted an admin action");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_share_one_shape() {
        let err = AuthError::InvalidCredentials.to_app_error();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = AuthError::Internal("connection refused at 10.0.0.5".into()).to_app_error();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Internal server error");

        let err = AuthError::Database(sqlx::Error::PoolTimedOut).to_app_error();
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_taken_maps_to_field_error() {
        let err = AuthError::EmailTaken.to_app_error();
        assert_eq!(err.status_code(), 422);
        assert!(err.field_errors().has("email"));
        assert!(!err.field_errors().has("user_name"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::Forbidden.kind().status_code(), 403);
        assert_eq!(AuthError::AccountNotFound.kind().status_code(), 404);
        assert_eq!(AuthError::SelfModification("x").kind().status_code(), 409);
        assert_eq!(AuthError::TokenInvalid.kind().status_code(), 400);
        assert_eq!(AuthError::SessionInvalid.kind().status_code(), 401);
    }
}
