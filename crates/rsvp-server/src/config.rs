//! Server configuration.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `RSVP_*` environment variables.

use std::net::SocketAddr;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 4321;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Secret for signing session cookies. Random per process when unset.
    pub session_secret: Option<String>,
    /// Public URL of the event page, used in invitation links.
    pub public_url: String,
    /// Event to create on startup when the store has none. Set when
    /// `RSVP_ADMIN_PASSWORD` is given; the in-memory backend falls back to
    /// [`SeedEvent::default`].
    pub seed: Option<SeedEvent>,
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// No database configured; data endpoints fail with
    /// "Database not configured".
    Unconfigured,
    /// In-memory (development only, data lost on restart).
    Memory,
    /// PostgreSQL.
    Postgres { url: String },
}

/// An event created at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEvent {
    pub name: String,
    pub admin_password: String,
    pub guest_password: String,
}

impl Default for SeedEvent {
    fn default() -> Self {
        Self {
            name: "My Event".to_owned(),
            admin_password: "admin".to_owned(),
            guest_password: "guest".to_owned(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on (binds to `0.0.0.0`)
    /// - `RSVP_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:4321`)
    /// - `RSVP_STORAGE`: `memory` or `postgres` (default: `postgres` if `DATABASE_URL` is set)
    /// - `DATABASE_URL`: PostgreSQL connection string
    /// - `RSVP_LOG_LEVEL`: log filter (default: `info`)
    /// - `RSVP_SESSION_SECRET`: session signing secret (default: random)
    /// - `RSVP_PUBLIC_URL`: event page URL for invitations (default: `http://localhost:4321/`)
    /// - `RSVP_ADMIN_PASSWORD`: seed an event on startup if none exists, with
    ///   `RSVP_EVENT_NAME` (default: `My Event`) and `RSVP_GUEST_PASSWORD` (default: `guest`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        // Priority: RSVP_BIND_ADDR > PORT > default 127.0.0.1:4321
        let default_addr = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT));
        let bind_addr = if let Some(addr) = var("RSVP_BIND_ADDR") {
            addr.parse().unwrap_or(default_addr)
        } else if let Some(port) = var("PORT") {
            SocketAddr::from(([0, 0, 0, 0], port.parse().unwrap_or(DEFAULT_PORT)))
        } else {
            default_addr
        };

        let database_url = var("DATABASE_URL").filter(|url| !url.is_empty());
        let storage_backend = match var("RSVP_STORAGE").map(|s| s.to_lowercase()).as_deref() {
            Some("memory") => StorageBackendType::Memory,
            Some("postgres" | "postgresql") | None => database_url
                .map_or(StorageBackendType::Unconfigured, |url| {
                    StorageBackendType::Postgres { url }
                }),
            Some(_) => StorageBackendType::Unconfigured,
        };

        // Empty values count as unset; an empty password would open the gate.
        let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());
        let seed = non_empty("RSVP_ADMIN_PASSWORD").map(|admin_password| {
            let defaults = SeedEvent::default();
            SeedEvent {
                name: non_empty("RSVP_EVENT_NAME").unwrap_or(defaults.name),
                admin_password,
                guest_password: non_empty("RSVP_GUEST_PASSWORD")
                    .unwrap_or(defaults.guest_password),
            }
        });

        Self {
            bind_addr,
            storage_backend,
            log_level: var("RSVP_LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
            session_secret: var("RSVP_SESSION_SECRET").filter(|s| !s.is_empty()),
            public_url: var("RSVP_PUBLIC_URL")
                .unwrap_or_else(|| format!("http://localhost:{DEFAULT_PORT}/")),
            seed,
        }
    }
}
