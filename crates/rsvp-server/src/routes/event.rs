//! Event details: `GET /api/event`.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use rsvp_core::auth::Role;
use rsvp_core::service::Overview;

use crate::error::AppError;
use crate::middleware::Session;
use crate::state::AppState;

/// Build the event router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/event", get(event))
}

/// `GET /api/event`: the event and its updates. Private events need a
/// guest or admin session.
async fn event(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<Overview>, AppError> {
    let overview = state.service()?.overview().await?;
    if !overview.event.is_public && !session.satisfies(Role::Guest) {
        return Err(AppError::Unauthorized("Guest login required".to_owned()));
    }
    Ok(Json(overview))
}
