//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::IssuedToken;
use crate::domain::entity::{account::Account, principal::Principal};
use crate::domain::value_object::token_purpose::TokenPurpose;

// ============================================================================
// Register
// ============================================================================

/// Register request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub confirm_password: Option<String>,
}

/// Legacy `action_createaccount` form body
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub confirm_password: Option<String>,
}

impl From<CreateAccountForm> for RegisterRequest {
    fn from(form: CreateAccountForm) -> Self {
        Self {
            user_name: form.username,
            email: form.email,
            password: form.password,
            confirm_password: form.confirm_password,
        }
    }
}

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// User name or email
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Legacy `action_login` form body
///
/// `remember_me` is a checkbox: present means checked.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub remember_me: Option<String>,
}

impl From<LoginForm> for SignInRequest {
    fn from(form: LoginForm) -> Self {
        Self {
            identifier: form.username,
            password: form.password,
            remember_me: form.remember_me.is_some_and(|v| !v.is_empty()),
        }
    }
}

/// Authenticated account summary, returned by sign in and register
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalResponse {
    pub public_id: String,
    pub user_name: String,
    pub role: String,
}

impl From<&Principal> for PrincipalResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            public_id: principal.public_id.to_string(),
            user_name: principal.user_name.original().to_string(),
            role: principal.role.code().to_string(),
        }
    }
}

// ============================================================================
// Session Status
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub public_id: Option<String>,
    pub role: Option<String>,
    pub expires_at_ms: Option<i64>,
}

// ============================================================================
// Accounts
// ============================================================================

/// Full account view (own profile, admin results)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub public_id: String,
    pub user_name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub email_verified: bool,
    pub created_at_ms: i64,
    pub last_seen_at_ms: Option<i64>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            public_id: account.public_id.to_string(),
            user_name: account.user_name.original().to_string(),
            email: account.email.as_str().to_string(),
            role: account.role.code().to_string(),
            status: account.status.code().to_string(),
            email_verified: account.email_verified,
            created_at_ms: account.created_at.timestamp_millis(),
            last_seen_at_ms: account.last_seen_at.map(|t| t.timestamp_millis()),
        }
    }
}

/// User list entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummaryResponse {
    pub public_id: String,
    pub user_name: String,
    pub role: String,
    pub status: String,
}

impl From<&Account> for AccountSummaryResponse {
    fn from(account: &Account) -> Self {
        Self {
            public_id: account.public_id.to_string(),
            user_name: account.user_name.original().to_string(),
            role: account.role.code().to_string(),
            status: account.status.code().to_string(),
        }
    }
}

/// Change password request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_new_password: String,
}

// ============================================================================
// Auth Tokens
// ============================================================================

/// Admin token issue request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenRequest {
    pub purpose: TokenPurpose,
}

/// Issued token; the plaintext is not retrievable again
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenResponse {
    pub token: String,
    pub purpose: TokenPurpose,
    pub expires_at_ms: i64,
}

impl From<IssuedToken> for IssueTokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            purpose: issued.purpose,
            expires_at_ms: issued.expires_at.timestamp_millis(),
        }
    }
}

/// Password reset with a token
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
    pub confirm_new_password: Option<String>,
}

/// Email verification with a token
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[serde(default)]
    pub token: String,
}
