//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::repository::AuthStore;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_auth_session;

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R: AuthStore>(repo: R, config: AuthConfig) -> Router {
    auth_routes(AuthAppState::new(repo, config))
}

/// Build the routes over existing state
///
/// Paths are relative; the binary nests them under `/auth`.
pub fn auth_routes<R: AuthStore>(state: AuthAppState<R>) -> Router {
    let protected = Router::new()
        .route("/profile", get(handlers::profile::<R>))
        .route("/change-password", post(handlers::change_password::<R>))
        .route("/users", get(handlers::list_users::<R>))
        .route("/users/{id}", get(handlers::view_user::<R>))
        .route(
            "/admin/users/{id}/toggle-active",
            post(handlers::toggle_active::<R>),
        )
        .route(
            "/admin/users/{id}/toggle-admin",
            post(handlers::toggle_admin::<R>),
        )
        .route("/admin/users/{id}/tokens", post(handlers::issue_token::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth_session::<R>,
        ));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::sign_in::<R>))
        .route("/logout", get(handlers::sign_out::<R>))
        .route("/status", get(handlers::session_status::<R>))
        .route("/password-reset", post(handlers::password_reset::<R>))
        .route("/verify-email", post(handlers::verify_email::<R>))
        // Legacy form endpoints
        .route("/action_login", post(handlers::login_form::<R>))
        .route("/action_logout", get(handlers::sign_out::<R>))
        .route(
            "/action_createaccount",
            post(handlers::create_account_form::<R>),
        )
        .merge(protected)
        .with_state(state)
}
