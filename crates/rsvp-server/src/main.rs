//! RSVP server entry point.
//!
//! Loads configuration, connects the storage backend, seeds the event if
//! asked to, then serves the Axum router with graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use rsvp_core::auth::SessionSigner;
use rsvp_core::EventService;
use rsvp_storage::{EventStore, MemoryStore, NewEvent};

use rsvp_server::config::{SeedEvent, ServerConfig, StorageBackendType};
use rsvp_server::routes;
use rsvp_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = %redacted(&config.storage_backend), "RSVP server starting");

    let state = build_app_state(&config).await?;
    let app = routes::router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "RSVP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("RSVP server stopped");
    Ok(())
}

/// Storage description safe to log.
fn redacted(backend: &StorageBackendType) -> &'static str {
    match backend {
        StorageBackendType::Unconfigured => "unconfigured",
        StorageBackendType::Memory => "memory",
        StorageBackendType::Postgres { .. } => "postgres",
    }
}

/// Build the shared application state.
async fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let store: Option<Arc<dyn EventStore>> = match &config.storage_backend {
        StorageBackendType::Unconfigured => {
            warn!("no database configured; data endpoints will fail");
            None
        }
        StorageBackendType::Memory => {
            info!("using in-memory storage (data will not persist)");
            let store: Arc<dyn EventStore> = Arc::new(MemoryStore::new());
            let seed = config.seed.clone().unwrap_or_default();
            seed_event(store.as_ref(), &seed).await?;
            Some(store)
        }
        #[cfg(feature = "postgres-backend")]
        StorageBackendType::Postgres { url } => {
            let store: Arc<dyn EventStore> = Arc::new(
                rsvp_storage::PostgresStore::connect(url)
                    .await
                    .context("failed to connect to PostgreSQL")?,
            );
            if let Some(seed) = &config.seed {
                seed_event(store.as_ref(), seed).await?;
            }
            Some(store)
        }
        #[cfg(not(feature = "postgres-backend"))]
        StorageBackendType::Postgres { .. } => {
            anyhow::bail!("PostgreSQL requested but feature 'postgres-backend' is not enabled");
        }
    };

    let sessions = if let Some(secret) = &config.session_secret {
        SessionSigner::new(secret.as_bytes())
    } else {
        warn!("RSVP_SESSION_SECRET not set; sessions will not survive a restart");
        SessionSigner::random()
    };

    Ok(Arc::new(AppState {
        service: store.map(EventService::new),
        sessions,
        public_url: config.public_url.clone(),
    }))
}

/// Create the event unless one already exists.
async fn seed_event(store: &dyn EventStore, seed: &SeedEvent) -> anyhow::Result<()> {
    if let Some(event) = store.get_event().await.context("failed to look up event")? {
        info!(event_id = %event.id, "event already exists, not seeding");
        return Ok(());
    }

    let event = store
        .create_event(NewEvent {
            name: seed.name.clone(),
            date: None,
            time: None,
            location: None,
            description: None,
            admin_password: seed.admin_password.clone(),
            guest_password: seed.guest_password.clone(),
            accepting_rsvps: true,
            is_public: false,
        })
        .await
        .context("failed to create event")?;

    info!(event_id = %event.id, name = %event.name, "event created");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
