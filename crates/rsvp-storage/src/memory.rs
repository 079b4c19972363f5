//! In-memory store for development and testing.
//!
//! All data lives behind a single `RwLock` and is lost when the process
//! exits. Uniqueness of (event, guest email) is enforced the same way the
//! PostgreSQL backend's unique constraint does.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Event, EventChanges, EventStore, NewEvent, NewRsvp, Rsvp, StorageError, Update,
};

#[derive(Debug, Default)]
struct Tables {
    events: Vec<Event>,
    /// Insertion order; listing reverses it.
    rsvps: Vec<Rsvp>,
    updates: Vec<Update>,
}

/// An in-memory [`EventStore`].
///
/// Cloning is cheap and clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EventStore for MemoryStore {
    async fn get_event(&self) -> Result<Option<Event>, StorageError> {
        let tables = self.tables.read().await;
        match tables.events.as_slice() {
            [] => Ok(None),
            [event] => Ok(Some(event.clone())),
            many => Err(StorageError::MultipleEvents { count: many.len() }),
        }
    }

    async fn create_event(&self, new: NewEvent) -> Result<Event, StorageError> {
        let event = Event {
            id: Uuid::new_v4(),
            name: new.name,
            date: new.date,
            time: new.time,
            location: new.location,
            description: new.description,
            admin_password_hash: new.admin_password,
            guest_password_hash: new.guest_password,
            accepting_rsvps: new.accepting_rsvps,
            is_public: new.is_public,
            created_at: Utc::now(),
        };
        self.tables.write().await.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(
        &self,
        event_id: Uuid,
        changes: &EventChanges,
    ) -> Result<Event, StorageError> {
        let mut tables = self.tables.write().await;
        let event = tables
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| StorageError::NotFound {
                what: "event".to_owned(),
            })?;
        changes.apply(event);
        Ok(event.clone())
    }

    async fn find_rsvp(&self, event_id: Uuid, email: &str) -> Result<Option<Rsvp>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .rsvps
            .iter()
            .find(|r| r.event_id == event_id && r.guest_email == email)
            .cloned())
    }

    async fn insert_rsvp(&self, new: &NewRsvp) -> Result<Rsvp, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.events.iter().any(|e| e.id == new.event_id) {
            return Err(StorageError::NotFound {
                what: "event".to_owned(),
            });
        }
        if tables
            .rsvps
            .iter()
            .any(|r| r.event_id == new.event_id && r.guest_email == new.guest_email)
        {
            return Err(StorageError::Duplicate {
                what: "rsvp".to_owned(),
            });
        }

        let rsvp = Rsvp {
            id: Uuid::new_v4(),
            event_id: new.event_id,
            guest_name: new.guest_name.clone(),
            guest_email: new.guest_email.clone(),
            guest_phone: new.guest_phone.clone(),
            response: new.response,
            message: new.message.clone(),
            created_at: Utc::now(),
        };
        tables.rsvps.push(rsvp.clone());
        Ok(rsvp)
    }

    async fn list_rsvps(&self, event_id: Uuid) -> Result<Vec<Rsvp>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .rsvps
            .iter()
            .rev()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn insert_update(&self, event_id: Uuid, content: &str) -> Result<Update, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.events.iter().any(|e| e.id == event_id) {
            return Err(StorageError::NotFound {
                what: "event".to_owned(),
            });
        }
        let update = Update {
            id: Uuid::new_v4(),
            event_id,
            content: content.to_owned(),
            created_at: Utc::now(),
        };
        tables.updates.push(update.clone());
        Ok(update)
    }

    async fn list_updates(&self, event_id: Uuid) -> Result<Vec<Update>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .updates
            .iter()
            .rev()
            .filter(|u| u.event_id == event_id)
            .cloned()
            .collect())
    }
}
