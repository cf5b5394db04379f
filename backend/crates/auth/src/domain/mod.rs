//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the lockout
//! policy.

pub mod entity;
pub mod repository;
pub mod service;
pub mod value_object;

// Re-exports
pub use entity::{
    account::Account, attempt_record::AttemptRecord, auth_session::AuthSession,
    auth_token::AuthToken, credential::Credential, principal::Principal,
};
pub use repository::{
    AccountRepository, AttemptLogRepository, AuthSessionRepository, AuthStore, AuthTokenRepository,
    CredentialRepository,
};
pub use service::lockout_policy::{LockoutDecision, LockoutPolicy, LockoutScope};
