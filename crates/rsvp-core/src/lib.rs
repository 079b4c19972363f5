//! Core library for the RSVP service.
//!
//! Validates guest and admin form posts, runs the RSVP and admin operations
//! against an [`rsvp_storage::EventStore`], checks event passwords and signs
//! session cookies, and builds invitation links. Knows nothing about HTTP.

pub mod auth;
pub mod error;
pub mod form;
pub mod invite;
pub mod service;

pub use service::EventService;
