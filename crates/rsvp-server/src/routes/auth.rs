//! Password login and logout.
//!
//! A correct password yields a signed session cookie and a redirect to the
//! page it unlocks. Login attempts are concurrency-limited.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use tower::limit::ConcurrencyLimitLayer;

use rsvp_core::auth::{clear_session_cookie, session_cookie, verify_password, Role};

use crate::error::AppError;
use crate::extract::FormData;
use crate::routes::found;
use crate::state::AppState;

/// Maximum concurrent login requests.
const LOGIN_CONCURRENCY: usize = 10;

/// Password form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub password: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<Arc<AppState>> {
    let login = Router::new()
        .route("/api/login", post(guest_login))
        .route("/api/admin/login", post(admin_login))
        .layer(ConcurrencyLimitLayer::new(LOGIN_CONCURRENCY));

    Router::new()
        .merge(login)
        .route("/api/logout", post(logout))
}

async fn login(
    state: &AppState,
    role: Role,
    form: &LoginForm,
    landing: &str,
) -> Result<Response, AppError> {
    let service = state.service()?;
    let password = form.password.as_deref().unwrap_or_default();

    if !verify_password(service.store(), role, password).await {
        tracing::warn!(%role, "login failed");
        return Err(AppError::Unauthorized("Invalid password".to_owned()));
    }

    let value = state.sessions.issue(role, Utc::now());
    tracing::info!(%role, "login succeeded");
    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie(role, &value))]),
        found(landing),
    )
        .into_response())
}

/// `POST /api/login`: guest password.
async fn guest_login(
    State(state): State<Arc<AppState>>,
    FormData(form): FormData<LoginForm>,
) -> Result<Response, AppError> {
    login(&state, Role::Guest, &form, "/").await
}

/// `POST /api/admin/login`: admin password.
async fn admin_login(
    State(state): State<Arc<AppState>>,
    FormData(form): FormData<LoginForm>,
) -> Result<Response, AppError> {
    login(&state, Role::Admin, &form, "/admin").await
}

/// `POST /api/logout`: drop both sessions.
async fn logout() -> Response {
    (
        AppendHeaders([
            (SET_COOKIE, clear_session_cookie(Role::Guest)),
            (SET_COOKIE, clear_session_cookie(Role::Admin)),
        ]),
        found("/"),
    )
        .into_response()
}
