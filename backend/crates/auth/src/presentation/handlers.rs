//! HTTP Handlers

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Form, Json};
use std::net::SocketAddr;
use std::sync::Arc;

use platform::client::ClientContext;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountAdminUseCase, AccountQueryUseCase, AuthTokensUseCase, ChangePasswordInput,
    ChangePasswordUseCase, CheckSessionUseCase, PasswordResetInput, RegisterInput,
    RegisterUseCase, SignInInput, SignInUseCase, SignOutUseCase,
};
use crate::domain::entity::{auth_session::AuthSession, principal::Principal};
use crate::domain::repository::AuthStore;
use crate::domain::value_object::public_id::PublicId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccountResponse, AccountSummaryResponse, ChangePasswordRequest, CreateAccountForm,
    IssueTokenRequest, IssueTokenResponse, LoginForm, PasswordResetRequest, PrincipalResponse,
    RegisterRequest, SessionStatusResponse, SignInRequest, VerifyEmailRequest,
};

/// Shared state for auth handlers
pub struct AuthAppState<R: AuthStore> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// derive(Clone) would require R: Clone
impl<R: AuthStore> Clone for AuthAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: AuthStore> AuthAppState<R> {
    pub fn new(repo: R, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
        }
    }

    pub(crate) fn client(&self, headers: &HeaderMap, addr: SocketAddr) -> ClientContext {
        ClientContext::from_headers(headers, Some(addr.ip()), self.config.trust_forwarded_for)
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(RegisterInput {
            user_name: req.user_name,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        })
        .await?;

    let principal = Principal::from(&output.account);
    Ok((StatusCode::CREATED, Json(PrincipalResponse::from(&principal))))
}

/// POST /auth/action_createaccount
pub async fn create_account_form<R: AuthStore>(
    state: State<AuthAppState<R>>,
    Form(form): Form<CreateAccountForm>,
) -> AuthResult<impl IntoResponse> {
    register(state, Json(RegisterRequest::from(form))).await
}

// ============================================================================
// Login / Logout
// ============================================================================

/// POST /auth/login
pub async fn sign_in<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Response> {
    let client = state.client(&headers, addr);

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            SignInInput {
                identity: req.identifier,
                password: req.password,
                remember_me: req.remember_me,
            },
            &client,
        )
        .await?;

    // Max-Age must match the session TTL chosen by remember_me
    let cookie = state
        .config
        .cookie()
        .set_cookie_header(&output.session_token, Some(output.max_age_secs))
        .map_err(header_error)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(PrincipalResponse::from(&output.principal)),
    )
        .into_response())
}

/// POST /auth/action_login
pub async fn login_form<R: AuthStore>(
    state: State<AuthAppState<R>>,
    headers: HeaderMap,
    connect_info: ConnectInfo<SocketAddr>,
    Form(form): Form<LoginForm>,
) -> AuthResult<Response> {
    sign_in(state, headers, connect_info, Json(SignInRequest::from(form))).await
}

/// GET /auth/logout
pub async fn sign_out<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse> {
    let cookie_config = state.config.cookie();
    let token = cookie_config.extract(&headers);

    let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
    if let Err(e) = use_case.execute(token.as_deref()).await {
        // The cookie is cleared regardless
        tracing::warn!(error = %e, "Failed to delete auth session on sign out");
    }

    let cookie = cookie_config.delete_cookie_header().map_err(header_error)?;
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /auth/status
pub async fn session_status<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Json<SessionStatusResponse> {
    let client = state.client(&headers, addr);
    let token = state.config.cookie().extract(&headers);

    let session_info = match token {
        Some(token) => CheckSessionUseCase::new(state.repo.clone(), state.config.clone())
            .execute(&token, &client.fingerprint)
            .await
            .ok(),
        None => None,
    };

    match session_info {
        Some(info) => Json(SessionStatusResponse {
            authenticated: true,
            public_id: Some(info.public_id),
            role: Some(info.role),
            expires_at_ms: Some(info.expires_at_ms),
        }),
        None => Json(SessionStatusResponse {
            authenticated: false,
            public_id: None,
            role: None,
            expires_at_ms: None,
        }),
    }
}

// ============================================================================
// Account (requires authentication)
// ============================================================================

/// GET /auth/profile
pub async fn profile<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Extension(session): Extension<AuthSession>,
) -> AuthResult<Json<AccountResponse>> {
    let account = AccountQueryUseCase::new(state.repo.clone())
        .profile(&session.account_id)
        .await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// POST /auth/change-password
pub async fn change_password<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<StatusCode> {
    let use_case =
        ChangePasswordUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    use_case
        .execute(
            &session.account_id,
            session.session_id,
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
                confirm_new_password: req.confirm_new_password,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/users
pub async fn list_users<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Extension(session): Extension<AuthSession>,
) -> AuthResult<Json<Vec<AccountSummaryResponse>>> {
    let accounts = AccountQueryUseCase::new(state.repo.clone())
        .list(&session.account_id)
        .await?;
    Ok(Json(accounts.iter().map(AccountSummaryResponse::from).collect()))
}

/// GET /auth/users/{id}
pub async fn view_user<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
) -> AuthResult<Json<AccountSummaryResponse>> {
    let target = parse_public_id(&id)?;
    let account = AccountQueryUseCase::new(state.repo.clone())
        .view(&session.account_id, &target)
        .await?;
    Ok(Json(AccountSummaryResponse::from(&account)))
}

// ============================================================================
// Admin (requires authentication; rights re-checked by the use case)
// ============================================================================

/// POST /auth/admin/users/{id}/toggle-active
pub async fn toggle_active<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
) -> AuthResult<Json<AccountResponse>> {
    let target = parse_public_id(&id)?;
    let account = AccountAdminUseCase::new(state.repo.clone(), state.repo.clone())
        .toggle_active(&session.account_id, &target)
        .await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// POST /auth/admin/users/{id}/toggle-admin
pub async fn toggle_admin<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
) -> AuthResult<Json<AccountResponse>> {
    let target = parse_public_id(&id)?;
    let account = AccountAdminUseCase::new(state.repo.clone(), state.repo.clone())
        .toggle_admin(&session.account_id, &target)
        .await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// POST /auth/admin/users/{id}/tokens
pub async fn issue_token<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
    Json(req): Json<IssueTokenRequest>,
) -> AuthResult<impl IntoResponse> {
    let target = parse_public_id(&id)?;
    let issued = tokens_use_case(&state)
        .issue(&session.account_id, &target, req.purpose)
        .await?;
    Ok((StatusCode::CREATED, Json(IssueTokenResponse::from(issued))))
}

// ============================================================================
// Token Consumption
// ============================================================================

/// POST /auth/password-reset
pub async fn password_reset<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<PasswordResetRequest>,
) -> AuthResult<StatusCode> {
    tokens_use_case(&state)
        .reset_password(PasswordResetInput {
            token: req.token,
            new_password: req.new_password,
            confirm_new_password: req.confirm_new_password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/verify-email
pub async fn verify_email<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<VerifyEmailRequest>,
) -> AuthResult<Json<AccountResponse>> {
    let account = tokens_use_case(&state).verify_email(&req.token).await?;
    Ok(Json(AccountResponse::from(&account)))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn tokens_use_case<R: AuthStore>(state: &AuthAppState<R>) -> AuthTokensUseCase<R, R, R, R> {
    AuthTokensUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    )
}

// A malformed id cannot name an account
fn parse_public_id(id: &str) -> AuthResult<PublicId> {
    PublicId::parse_str(id).ok_or(AuthError::AccountNotFound)
}

fn header_error(err: header::InvalidHeaderValue) -> AuthError {
    AuthError::Internal(format!("Invalid Set-Cookie header: {err}"))
}
