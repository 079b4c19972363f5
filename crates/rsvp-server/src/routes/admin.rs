//! Admin routes. Every route here requires an admin session.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::middleware as axum_mw;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use rsvp_core::form::AdminForm;
use rsvp_core::service::GuestList;
use rsvp_storage::Attendance;

use crate::error::AppError;
use crate::extract::FormData;
use crate::middleware::require_admin;
use crate::routes::found;
use crate::state::AppState;

/// Query for the invite link.
#[derive(Debug, Deserialize)]
pub struct InviteQuery {
    /// Only invite guests who answered this (`yes`, `no`, `maybe`).
    pub response: Option<String>,
}

/// Response for the invite link.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub mailto: String,
}

/// Build the admin router, gated on an admin session.
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin-actions", post(admin_action))
        .route("/api/admin/rsvps", get(list_rsvps))
        .route("/api/admin/invite", get(invite))
        .route_layer(axum_mw::from_fn_with_state(state, require_admin))
}

/// `POST /api/admin-actions`: update the event or post an update, then
/// redirect back to the admin page with a confirmation.
async fn admin_action(
    State(state): State<Arc<AppState>>,
    FormData(form): FormData<AdminForm>,
) -> Result<Response, AppError> {
    let outcome = state.service()?.admin_action(&form).await?;
    Ok(found(&format!(
        "/admin?success={}",
        urlencoding::encode(outcome.message())
    )))
}

/// `GET /api/admin/rsvps`: every RSVP with response counts.
async fn list_rsvps(State(state): State<Arc<AppState>>) -> Result<Json<GuestList>, AppError> {
    Ok(Json(state.service()?.guest_list().await?))
}

/// `GET /api/admin/invite`: a `mailto:` link inviting the guests.
async fn invite(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InviteQuery>,
) -> Result<Json<InviteResponse>, AppError> {
    let filter = match query.response.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<Attendance>()
                .map_err(|_| AppError::BadRequest("Invalid response".to_owned()))?,
        ),
    };

    let mailto = state
        .service()?
        .invite_link(&state.public_url, filter)
        .await?;
    Ok(Json(InviteResponse { mailto }))
}
