//! Session extraction and the admin gate.
//!
//! Sessions are resolved from the `Cookie` header on every request that
//! asks for them. Handlers take a [`Session`] extractor; admin routes sit
//! behind [`require_admin`].

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use rsvp_core::auth::Role;

use crate::error::AppError;
use crate::state::AppState;

/// The role proven by the request's session cookies, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session(pub Option<Role>);

impl Session {
    /// Resolve the session from request headers.
    #[must_use]
    pub fn from_headers(state: &AppState, headers: &HeaderMap) -> Self {
        let role = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|cookies| state.sessions.authenticated_role(cookies, Utc::now()));
        Self(role)
    }

    /// Whether this session passes a gate for `required`.
    #[must_use]
    pub fn satisfies(self, required: Role) -> bool {
        self.0.is_some_and(|role| role.satisfies(required))
    }
}

impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(state, &parts.headers))
    }
}

/// Middleware rejecting requests without a valid admin session.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] if no admin session cookie verifies.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !Session::from_headers(&state, req.headers()).satisfies(Role::Admin) {
        tracing::debug!(path = %req.uri().path(), "admin session missing");
        return Err(AppError::Unauthorized("Admin login required".to_owned()));
    }
    Ok(next.run(req).await)
}
