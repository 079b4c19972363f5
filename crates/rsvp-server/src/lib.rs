//! RSVP HTTP server.
//!
//! Wires the core library and a storage backend into an Axum router serving
//! the guest RSVP form, the admin form, password logins and JSON views of
//! the event.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;
