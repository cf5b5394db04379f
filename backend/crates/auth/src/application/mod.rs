//! Application Layer
//!
//! Use cases and application services.

pub mod account_admin;
pub mod account_query;
pub mod auth_gateway;
pub mod auth_tokens;
pub mod change_password;
pub mod check_session;
pub mod config;
pub mod register;
pub mod session_token;
pub mod sign_in;
pub mod sign_out;

// Re-exports
pub use account_admin::AccountAdminUseCase;
pub use account_query::AccountQueryUseCase;
pub use auth_gateway::AuthGateway;
pub use auth_tokens::{AuthTokensUseCase, IssuedToken, PasswordResetInput};
pub use change_password::{ChangePasswordInput, ChangePasswordUseCase};
pub use check_session::{CheckSessionUseCase, SessionInfoOutput};
pub use config::AuthConfig;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
