//! HTTP routes.
//!
//! ```text
//! POST /api/rsvp             guest RSVP form
//! POST /api/login            guest password → session cookie
//! POST /api/admin/login      admin password → session cookie
//! POST /api/logout           clear both sessions
//! GET  /api/event            event details + updates
//! POST /api/admin-actions    admin form (update_event | post_update)   [admin]
//! GET  /api/admin/rsvps      guest list + counts                       [admin]
//! GET  /api/admin/invite     mailto invitation link                    [admin]
//! GET  /health               liveness
//! ```

pub mod admin;
pub mod auth;
pub mod event;
pub mod rsvp;
pub mod sys;

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the complete router with middleware and state applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(rsvp::router())
        .merge(auth::router())
        .merge(event::router())
        .merge(admin::router(Arc::clone(&state)))
        .merge(sys::router())
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}
