//! Auth Middleware
//!
//! Middleware for requiring authentication on protected routes.

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;

use crate::application::CheckSessionUseCase;
use crate::domain::repository::AuthStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::handlers::AuthAppState;

/// Middleware that requires a valid auth session
///
/// On success the `AuthSession` is stored in request extensions for
/// downstream handlers.
pub async fn require_auth_session<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut req: Request,
    next: Next,
) -> AuthResult<Response> {
    let headers = req.headers();
    let client = state.client(headers, addr);

    let token = state
        .config
        .cookie()
        .extract(headers)
        .ok_or(AuthError::SessionInvalid)?;

    let session = CheckSessionUseCase::new(state.repo.clone(), state.config.clone())
        .get_session(&token, &client.fingerprint)
        .await?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
