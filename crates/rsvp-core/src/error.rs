//! Error types for `rsvp-core`.
//!
//! Display strings are the user-facing messages the HTTP layer returns
//! verbatim. Storage failures keep the underlying error as their source so
//! it can be logged without leaking into responses.

use rsvp_storage::StorageError;

/// A submitted form failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Guest name missing or shorter than two characters.
    #[error("Invalid name")]
    InvalidName,

    /// Guest email missing or without an `@`.
    #[error("Invalid email")]
    InvalidEmail,

    /// Response is not one of `yes`, `no`, `maybe`.
    #[error("Invalid response")]
    InvalidResponse,

    /// Admin form carried an unknown or missing `action`.
    #[error("Invalid action")]
    InvalidAction,

    /// Event name missing or shorter than two characters.
    #[error("Invalid event name")]
    InvalidEventName,

    /// Event date is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid event date")]
    InvalidDate { value: String },

    /// Update content shorter than five characters.
    #[error("Update content is too short")]
    ContentTooShort,
}

/// Errors from RSVP submission.
#[derive(Debug, thiserror::Error)]
pub enum RsvpError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No event exists, or it could not be loaded.
    #[error("Event not found")]
    EventNotFound,

    /// The event is private and the caller holds no session.
    #[error("Guest login required")]
    LoginRequired,

    /// The event stopped accepting RSVPs.
    #[error("RSVPs are currently closed")]
    Closed,

    /// The guest email already has an RSVP.
    #[error("You have already RSVPed for this event")]
    AlreadyResponded,

    /// The insert failed.
    #[error("Failed to save RSVP")]
    Save(#[source] StorageError),
}

/// Errors from admin actions.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No event exists, or it could not be loaded.
    #[error("Event not found")]
    EventNotFound,

    /// Writing the event details failed.
    #[error("Failed to update event")]
    UpdateEvent(#[source] StorageError),

    /// Inserting the update failed.
    #[error("Failed to post update")]
    PostUpdate(#[source] StorageError),
}

/// Errors from read-only views.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// No event exists, or it could not be loaded.
    #[error("Event not found")]
    EventNotFound,

    /// Listing RSVPs or updates failed.
    #[error("Failed to load event data")]
    Storage(#[source] StorageError),
}
