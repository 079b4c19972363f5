//! RSVP and admin operations over an [`EventStore`].
//!
//! Every operation first loads the deployment's single event. A missing
//! event and a failed lookup are reported the same way, as "event not
//! found"; the lookup failure is logged.

use std::sync::Arc;

use rsvp_storage::{Attendance, Event, EventStore, Rsvp, StorageError, Update};
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::Role;
use crate::error::{AdminError, ReadError, RsvpError};
use crate::form::{AdminAction, AdminForm, RsvpForm};
use crate::invite::{InviteDetails, invite_mailto};

/// Result of a successful admin action.
#[derive(Debug, Clone)]
pub enum AdminOutcome {
    EventUpdated(Event),
    UpdatePosted(Update),
}

impl AdminOutcome {
    /// Confirmation shown to the admin.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EventUpdated(_) => "Event updated successfully",
            Self::UpdatePosted(_) => "Update posted successfully",
        }
    }
}

/// The public view of the event.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub event: Event,
    pub updates: Vec<Update>,
}

/// RSVP counts by response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub yes: usize,
    pub no: usize,
    pub maybe: usize,
    pub total: usize,
}

impl Summary {
    /// Tally a list of RSVPs.
    #[must_use]
    pub fn tally(rsvps: &[Rsvp]) -> Self {
        rsvps.iter().fold(Self::default(), |mut s, r| {
            match r.response {
                Attendance::Yes => s.yes += 1,
                Attendance::No => s.no += 1,
                Attendance::Maybe => s.maybe += 1,
            }
            s.total += 1;
            s
        })
    }
}

/// The admin's view of who responded.
#[derive(Debug, Clone, Serialize)]
pub struct GuestList {
    pub rsvps: Vec<Rsvp>,
    pub summary: Summary,
}

/// Event operations, shared across request handlers.
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl std::fmt::Debug for EventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventService").finish_non_exhaustive()
    }
}

impl EventService {
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn EventStore {
        self.store.as_ref()
    }

    async fn load_event(&self) -> Option<Event> {
        match self.store.get_event().await {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "failed to load event");
                None
            }
        }
    }

    /// Fetch the event.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::EventNotFound`] if it is missing or unreadable.
    pub async fn event(&self) -> Result<Event, ReadError> {
        self.load_event().await.ok_or(ReadError::EventNotFound)
    }

    /// Record a guest's RSVP.
    ///
    /// `session` is the role proven by the caller's cookies, if any; it is
    /// only consulted when the event is private.
    ///
    /// # Errors
    ///
    /// Validation failures first, then [`RsvpError::EventNotFound`],
    /// [`RsvpError::LoginRequired`], [`RsvpError::Closed`],
    /// [`RsvpError::AlreadyResponded`] or [`RsvpError::Save`], in that order.
    pub async fn submit_rsvp(
        &self,
        form: &RsvpForm,
        session: Option<Role>,
    ) -> Result<Rsvp, RsvpError> {
        let submission = form.validate()?;

        let event = self.load_event().await.ok_or(RsvpError::EventNotFound)?;

        if !event.is_public && !session.is_some_and(|r| r.satisfies(Role::Guest)) {
            return Err(RsvpError::LoginRequired);
        }

        if !event.accepting_rsvps {
            return Err(RsvpError::Closed);
        }

        // A failed lookup is not fatal; the unique constraint still guards
        // the insert below.
        match self.store.find_rsvp(event.id, &submission.guest_email).await {
            Ok(Some(_)) => return Err(RsvpError::AlreadyResponded),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "duplicate RSVP check failed"),
        }

        let rsvp = self
            .store
            .insert_rsvp(&submission.into_new_rsvp(event.id))
            .await
            .map_err(|e| match e {
                StorageError::Duplicate { .. } => RsvpError::AlreadyResponded,
                other => RsvpError::Save(other),
            })?;

        info!(rsvp_id = %rsvp.id, response = %rsvp.response, "rsvp recorded");
        Ok(rsvp)
    }

    /// Run an admin form action.
    ///
    /// The event is loaded before the action is inspected, so a missing
    /// event wins over an invalid action.
    ///
    /// # Errors
    ///
    /// [`AdminError::EventNotFound`], a validation error, or the storage
    /// failure of the chosen action.
    pub async fn admin_action(&self, form: &AdminForm) -> Result<AdminOutcome, AdminError> {
        let event = self.load_event().await.ok_or(AdminError::EventNotFound)?;

        match form.action()? {
            AdminAction::UpdateEvent => {
                let changes = form.event_changes()?;
                let event = self
                    .store
                    .update_event(event.id, &changes)
                    .await
                    .map_err(AdminError::UpdateEvent)?;
                info!(event_id = %event.id, "event updated");
                Ok(AdminOutcome::EventUpdated(event))
            }
            AdminAction::PostUpdate => {
                let content = form.update_content()?;
                let update = self
                    .store
                    .insert_update(event.id, &content)
                    .await
                    .map_err(AdminError::PostUpdate)?;
                info!(update_id = %update.id, "update posted");
                Ok(AdminOutcome::UpdatePosted(update))
            }
        }
    }

    /// The event with its updates, newest first.
    ///
    /// # Errors
    ///
    /// [`ReadError::EventNotFound`] or [`ReadError::Storage`].
    pub async fn overview(&self) -> Result<Overview, ReadError> {
        let event = self.event().await?;
        let updates = self
            .store
            .list_updates(event.id)
            .await
            .map_err(ReadError::Storage)?;
        Ok(Overview { event, updates })
    }

    /// All RSVPs with response counts.
    ///
    /// # Errors
    ///
    /// [`ReadError::EventNotFound`] or [`ReadError::Storage`].
    pub async fn guest_list(&self) -> Result<GuestList, ReadError> {
        let event = self.event().await?;
        let rsvps = self
            .store
            .list_rsvps(event.id)
            .await
            .map_err(ReadError::Storage)?;
        let summary = Summary::tally(&rsvps);
        Ok(GuestList { rsvps, summary })
    }

    /// A `mailto:` invitation to every guest, or only those who answered
    /// `filter`.
    ///
    /// # Errors
    ///
    /// [`ReadError::EventNotFound`] or [`ReadError::Storage`].
    pub async fn invite_link(
        &self,
        event_url: &str,
        filter: Option<Attendance>,
    ) -> Result<String, ReadError> {
        let event = self.event().await?;
        let rsvps = self
            .store
            .list_rsvps(event.id)
            .await
            .map_err(ReadError::Storage)?;

        let emails = rsvps
            .iter()
            .filter(|r| filter.is_none_or(|f| r.response == f))
            .map(|r| r.guest_email.as_str());

        Ok(invite_mailto(emails, &InviteDetails::from(&event), event_url))
    }
}
