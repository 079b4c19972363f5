//! Shared application state.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use rsvp_core::auth::SessionSigner;
use rsvp_core::EventService;

use crate::error::AppError;

/// Shared application state passed to all HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    /// Event operations (None if no database is configured).
    pub service: Option<EventService>,
    /// Signs and checks session cookies.
    pub sessions: SessionSigner,
    /// Event page URL used in invitation links.
    pub public_url: String,
}

impl AppState {
    /// The event service.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotConfigured`] when no database is configured.
    pub fn service(&self) -> Result<&EventService, AppError> {
        self.service.as_ref().ok_or(AppError::NotConfigured)
    }
}
