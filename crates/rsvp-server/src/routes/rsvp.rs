//! Guest RSVP submission: `POST /api/rsvp`.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::Router;

use rsvp_core::form::RsvpForm;

use crate::error::AppError;
use crate::extract::FormData;
use crate::middleware::Session;
use crate::routes::found;
use crate::state::AppState;

/// Where a successful RSVP lands.
pub const SUCCESS_LOCATION: &str = "/?success=true";

/// Build the RSVP router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/rsvp", post(submit_rsvp))
}

/// `POST /api/rsvp`: validate and record an RSVP, then redirect home.
async fn submit_rsvp(
    State(state): State<Arc<AppState>>,
    Session(role): Session,
    FormData(form): FormData<RsvpForm>,
) -> Result<Response, AppError> {
    state.service()?.submit_rsvp(&form, role).await?;
    Ok(found(SUCCESS_LOCATION))
}
