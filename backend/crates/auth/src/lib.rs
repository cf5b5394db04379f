//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits, lockout policy
//! - `application/` - Use cases and the authentication gateway
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration with user name, email and password
//! - Login by user name or email, with optional "remember me"
//! - Login rate limiting: every attempt is recorded, and an identity with
//!   too many recent failures is locked out for a sliding window
//! - Server-side sessions with signed cookie references
//! - Member and administrator roles; admins toggle accounts active/admin
//! - Single-use password-reset and email-verification tokens
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional server-side pepper
//! - Every login failure (lockout included) looks the same to the caller
//! - Unknown identities cost a dummy hash verification
//! - Sessions bound to the client fingerprint (User-Agent)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::AuthGateway;
pub use domain::repository::AuthStore;
pub use error::{AuthError, AuthResult};
pub use infra::memory::InMemoryAuthRepository;
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
