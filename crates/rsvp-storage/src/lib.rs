//! Storage layer for the RSVP service.
//!
//! This crate defines the data records and the [`EventStore`] trait, an async
//! persistence interface that knows nothing about forms, sessions or HTTP.
//! Validation happens in `rsvp-core` before anything reaches this layer.
//!
//! Two implementations are provided:
//!
//! - [`PostgresStore`]: production backend (feature `postgres-backend`)
//! - [`MemoryStore`]: in-memory, for development and tests

mod error;
mod memory;
pub mod models;
#[cfg(feature = "postgres-backend")]
mod postgres_backend;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use models::{Attendance, Event, EventChanges, NewEvent, NewRsvp, Rsvp, Update};
#[cfg(feature = "postgres-backend")]
pub use postgres_backend::PostgresStore;

use uuid::Uuid;

/// Persistence for the single event, its RSVPs and its updates.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// Fetch the deployment's event.
    ///
    /// Returns `Ok(None)` when no event has been created yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MultipleEvents`] if more than one event row
    /// exists, or [`StorageError::Query`] if the backend fails.
    async fn get_event(&self) -> Result<Option<Event>, StorageError>;

    /// Create the event.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Query`] if the backend fails.
    async fn create_event(&self, new: NewEvent) -> Result<Event, StorageError>;

    /// Overwrite the editable event fields and return the stored result.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if `event_id` is unknown.
    async fn update_event(
        &self,
        event_id: Uuid,
        changes: &EventChanges,
    ) -> Result<Event, StorageError>;

    /// Look up an RSVP by its (already normalised) guest email.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Query`] if the backend fails.
    async fn find_rsvp(&self, event_id: Uuid, email: &str) -> Result<Option<Rsvp>, StorageError>;

    /// Insert an RSVP.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Duplicate`] if the guest email already has an
    /// RSVP for this event.
    async fn insert_rsvp(&self, new: &NewRsvp) -> Result<Rsvp, StorageError>;

    /// All RSVPs for an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Query`] if the backend fails.
    async fn list_rsvps(&self, event_id: Uuid) -> Result<Vec<Rsvp>, StorageError>;

    /// Post an update to an event.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Query`] if the backend fails.
    async fn insert_update(&self, event_id: Uuid, content: &str) -> Result<Update, StorageError>;

    /// All updates for an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Query`] if the backend fails.
    async fn list_updates(&self, event_id: Uuid) -> Result<Vec<Update>, StorageError>;
}
