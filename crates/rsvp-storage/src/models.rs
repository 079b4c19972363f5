//! Data records.
//!
//! Three flat records: the deployment's single [`Event`], guest [`Rsvp`]s and
//! admin-posted [`Update`]s. RSVPs and updates reference the event by id.
//! Password columns are stored as plaintext and never serialized.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Event ────────────────────────────────────────────────────────────

/// The event guests respond to.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "postgres-backend", derive(sqlx::FromRow))]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(skip)]
    pub admin_password_hash: String,
    #[serde(skip)]
    pub guest_password_hash: String,
    pub accepting_rsvps: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create the event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub admin_password: String,
    pub guest_password: String,
    pub accepting_rsvps: bool,
    pub is_public: bool,
}

/// An admin edit of the event details.
///
/// `date: None` keeps the stored date; every other optional field is written
/// as given, so `None` clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChanges {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub accepting_rsvps: bool,
    pub is_public: bool,
}

impl EventChanges {
    /// Apply these changes to an in-memory event.
    pub fn apply(&self, event: &mut Event) {
        event.name.clone_from(&self.name);
        if let Some(date) = self.date {
            event.date = Some(date);
        }
        event.time.clone_from(&self.time);
        event.location.clone_from(&self.location);
        event.description.clone_from(&self.description);
        event.accepting_rsvps = self.accepting_rsvps;
        event.is_public = self.is_public;
    }
}

// ── RSVPs ────────────────────────────────────────────────────────────

/// A guest's attendance answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "postgres-backend",
    derive(sqlx::Type),
    sqlx(type_name = "text", rename_all = "lowercase")
)]
pub enum Attendance {
    Yes,
    No,
    Maybe,
}

impl Attendance {
    /// The lowercase wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Maybe => "maybe",
        }
    }
}

impl std::fmt::Display for Attendance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Attendance {
    type Err = String;

    /// Exact, case-sensitive match on `yes`, `no` or `maybe`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "maybe" => Ok(Self::Maybe),
            other => Err(format!("unknown response: {other}")),
        }
    }
}

/// A stored RSVP.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "postgres-backend", derive(sqlx::FromRow))]
pub struct Rsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub response: Attendance,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated RSVP ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRsvp {
    pub event_id: Uuid,
    pub guest_name: String,
    /// Trimmed and lowercased.
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub response: Attendance,
    pub message: Option<String>,
}

// ── Updates ──────────────────────────────────────────────────────────

/// An announcement posted by the admin.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "postgres-backend", derive(sqlx::FromRow))]
pub struct Update {
    pub id: Uuid,
    pub event_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
