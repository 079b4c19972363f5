//! PostgreSQL store.
//!
//! Three tables: `event`, `rsvps` and `updates`. The schema is created on
//! connect if it does not exist. A unique index on `(event_id, guest_email)`
//! backs the one-RSVP-per-guest rule.
//!
//! Feature-gated behind `postgres-backend`.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    Event, EventChanges, EventStore, NewEvent, NewRsvp, Rsvp, StorageError, Update,
};

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS event (\
        id                  UUID        PRIMARY KEY DEFAULT gen_random_uuid(), \
        name                TEXT        NOT NULL, \
        date                DATE, \
        time                TEXT, \
        location            TEXT, \
        description         TEXT, \
        admin_password_hash TEXT        NOT NULL, \
        guest_password_hash TEXT        NOT NULL, \
        accepting_rsvps     BOOLEAN     NOT NULL DEFAULT TRUE, \
        is_public           BOOLEAN     NOT NULL DEFAULT FALSE, \
        created_at          TIMESTAMPTZ NOT NULL DEFAULT now()\
    )",
    "CREATE TABLE IF NOT EXISTS rsvps (\
        id          UUID        PRIMARY KEY DEFAULT gen_random_uuid(), \
        event_id    UUID        NOT NULL REFERENCES event (id) ON DELETE CASCADE, \
        guest_name  TEXT        NOT NULL, \
        guest_email TEXT        NOT NULL, \
        guest_phone TEXT, \
        response    TEXT        NOT NULL CHECK (response IN ('yes', 'no', 'maybe')), \
        message     TEXT, \
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()\
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_rsvps_event_email \
     ON rsvps (event_id, guest_email)",
    "CREATE TABLE IF NOT EXISTS updates (\
        id         UUID        PRIMARY KEY DEFAULT gen_random_uuid(), \
        event_id   UUID        NOT NULL REFERENCES event (id) ON DELETE CASCADE, \
        content    TEXT        NOT NULL, \
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()\
    )",
];

/// An [`EventStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("pool", &"[PgPool]")
            .finish_non_exhaustive()
    }
}

impl PostgresStore {
    /// Connect to PostgreSQL and create the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connect`] if the connection or migration fails.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Connect {
                reason: e.to_string(),
            })?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool without running migrations.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Connect {
                    reason: format!("migration failed: {e}"),
                })?;
        }
        tracing::debug!("event schema ready");
        Ok(())
    }
}

/// Map a sqlx error, turning unique violations into [`StorageError::Duplicate`].
fn map_err(err: sqlx::Error, what: &str) -> StorageError {
    match &err {
        sqlx::Error::RowNotFound => StorageError::NotFound {
            what: what.to_owned(),
        },
        // PostgreSQL unique violation
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            StorageError::Duplicate {
                what: what.to_owned(),
            }
        }
        _ => StorageError::Query {
            reason: err.to_string(),
        },
    }
}

#[async_trait::async_trait]
impl EventStore for PostgresStore {
    async fn get_event(&self) -> Result<Option<Event>, StorageError> {
        // Two rows are enough to tell "exactly one" from "ambiguous".
        let mut rows =
            sqlx::query_as::<_, Event>("SELECT * FROM event ORDER BY created_at LIMIT 2")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_err(e, "event"))?;

        if rows.len() > 1 {
            let count: i64 = sqlx::query_scalar("SELECT count(*) FROM event")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_err(e, "event"))?;
            return Err(StorageError::MultipleEvents {
                count: usize::try_from(count).unwrap_or(usize::MAX),
            });
        }
        Ok(rows.pop())
    }

    async fn create_event(&self, new: NewEvent) -> Result<Event, StorageError> {
        sqlx::query_as::<_, Event>(
            r"INSERT INTO event
                (name, date, time, location, description,
                 admin_password_hash, guest_password_hash, accepting_rsvps, is_public)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              RETURNING *",
        )
        .bind(&new.name)
        .bind(new.date)
        .bind(&new.time)
        .bind(&new.location)
        .bind(&new.description)
        .bind(&new.admin_password)
        .bind(&new.guest_password)
        .bind(new.accepting_rsvps)
        .bind(new.is_public)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err(e, "event"))
    }

    async fn update_event(
        &self,
        event_id: Uuid,
        changes: &EventChanges,
    ) -> Result<Event, StorageError> {
        sqlx::query_as::<_, Event>(
            r"UPDATE event
              SET name = $2,
                  date = COALESCE($3, date),
                  time = $4,
                  location = $5,
                  description = $6,
                  accepting_rsvps = $7,
                  is_public = $8
              WHERE id = $1
              RETURNING *",
        )
        .bind(event_id)
        .bind(&changes.name)
        .bind(changes.date)
        .bind(&changes.time)
        .bind(&changes.location)
        .bind(&changes.description)
        .bind(changes.accepting_rsvps)
        .bind(changes.is_public)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err(e, "event"))?
        .ok_or_else(|| StorageError::NotFound {
            what: "event".to_owned(),
        })
    }

    async fn find_rsvp(&self, event_id: Uuid, email: &str) -> Result<Option<Rsvp>, StorageError> {
        sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps WHERE event_id = $1 AND guest_email = $2")
            .bind(event_id)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_err(e, "rsvp"))
    }

    async fn insert_rsvp(&self, new: &NewRsvp) -> Result<Rsvp, StorageError> {
        sqlx::query_as::<_, Rsvp>(
            r"INSERT INTO rsvps (event_id, guest_name, guest_email, guest_phone, response, message)
              VALUES ($1, $2, $3, $4, $5, $6)
              RETURNING *",
        )
        .bind(new.event_id)
        .bind(&new.guest_name)
        .bind(&new.guest_email)
        .bind(&new.guest_phone)
        .bind(new.response)
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err(e, "rsvp"))
    }

    async fn list_rsvps(&self, event_id: Uuid) -> Result<Vec<Rsvp>, StorageError> {
        sqlx::query_as::<_, Rsvp>(
            "SELECT * FROM rsvps WHERE event_id = $1 ORDER BY created_at DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "rsvp"))
    }

    async fn insert_update(&self, event_id: Uuid, content: &str) -> Result<Update, StorageError> {
        sqlx::query_as::<_, Update>(
            r"INSERT INTO updates (event_id, content)
              VALUES ($1, $2)
              RETURNING *",
        )
        .bind(event_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err(e, "update"))
    }

    async fn list_updates(&self, event_id: Uuid) -> Result<Vec<Update>, StorageError> {
        sqlx::query_as::<_, Update>(
            "SELECT * FROM updates WHERE event_id = $1 ORDER BY created_at DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "update"))
    }
}
