//! Form parsing and validation.
//!
//! Every field arrives as an optional string, exactly as a browser posts an
//! `application/x-www-form-urlencoded` body. Validation trims, normalises
//! and rejects in a fixed order so the first failing field is the one
//! reported.

use chrono::NaiveDate;
use rsvp_storage::{Attendance, EventChanges, NewRsvp};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ValidationError;

/// Minimum length of a guest or event name, in UTF-16 code units.
pub const MIN_NAME_CHARS: usize = 2;

/// Minimum length of an update's content, in UTF-16 code units.
pub const MIN_UPDATE_CHARS: usize = 5;

/// Trim a field and drop it if nothing is left.
fn non_empty(field: Option<&String>) -> Option<&str> {
    field.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Length as a browser counts it: UTF-16 code units, so an emoji is two.
fn input_len(value: &str) -> usize {
    value.encode_utf16().count()
}

fn owned(field: Option<&String>) -> Option<String> {
    non_empty(field).map(str::to_owned)
}

// ── RSVP form ────────────────────────────────────────────────────────

/// Raw RSVP form as posted by a guest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsvpForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub response: Option<String>,
    pub message: Option<String>,
}

/// A validated RSVP, not yet bound to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpSubmission {
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub response: Attendance,
    pub message: Option<String>,
}

impl RsvpForm {
    /// Validate name, then email, then response.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self) -> Result<RsvpSubmission, ValidationError> {
        let name = non_empty(self.name.as_ref())
            .filter(|n| input_len(n) >= MIN_NAME_CHARS)
            .ok_or(ValidationError::InvalidName)?;

        let email = non_empty(self.email.as_ref())
            .map(str::to_lowercase)
            .filter(|e| e.contains('@'))
            .ok_or(ValidationError::InvalidEmail)?;

        let response = self
            .response
            .as_deref()
            .and_then(|r| r.parse::<Attendance>().ok())
            .ok_or(ValidationError::InvalidResponse)?;

        Ok(RsvpSubmission {
            guest_name: name.to_owned(),
            guest_email: email,
            guest_phone: owned(self.phone.as_ref()),
            response,
            message: owned(self.message.as_ref()),
        })
    }
}

impl RsvpSubmission {
    /// Bind this submission to an event for insertion.
    #[must_use]
    pub fn into_new_rsvp(self, event_id: Uuid) -> NewRsvp {
        NewRsvp {
            event_id,
            guest_name: self.guest_name,
            guest_email: self.guest_email,
            guest_phone: self.guest_phone,
            response: self.response,
            message: self.message,
        }
    }
}

// ── Admin form ───────────────────────────────────────────────────────

/// What an admin form post asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    UpdateEvent,
    PostUpdate,
}

impl std::str::FromStr for AdminAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update_event" => Ok(Self::UpdateEvent),
            "post_update" => Ok(Self::PostUpdate),
            _ => Err(ValidationError::InvalidAction),
        }
    }
}

/// Raw admin form. One form carries both actions; which fields matter
/// depends on `action`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminForm {
    pub action: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Checkbox: any value, even empty, means checked.
    pub accepting_rsvps: Option<String>,
    /// Checkbox: any value, even empty, means checked.
    pub is_public: Option<String>,
    pub content: Option<String>,
}

impl AdminForm {
    /// Parse the `action` field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAction`] if missing or unknown.
    pub fn action(&self) -> Result<AdminAction, ValidationError> {
        self.action
            .as_deref()
            .ok_or(ValidationError::InvalidAction)?
            .parse()
    }

    /// Validate the `update_event` fields.
    ///
    /// The date is not trimmed; an empty date keeps the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEventName`] or
    /// [`ValidationError::InvalidDate`].
    pub fn event_changes(&self) -> Result<EventChanges, ValidationError> {
        let name = non_empty(self.name.as_ref())
            .filter(|n| input_len(n) >= MIN_NAME_CHARS)
            .ok_or(ValidationError::InvalidEventName)?;

        let date = match self.date.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ValidationError::InvalidDate {
                    value: raw.to_owned(),
                }
            })?),
        };

        Ok(EventChanges {
            name: name.to_owned(),
            date,
            time: owned(self.time.as_ref()),
            location: owned(self.location.as_ref()),
            description: owned(self.description.as_ref()),
            accepting_rsvps: self.accepting_rsvps.is_some(),
            is_public: self.is_public.is_some(),
        })
    }

    /// Validate the `post_update` content.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ContentTooShort`].
    pub fn update_content(&self) -> Result<String, ValidationError> {
        non_empty(self.content.as_ref())
            .filter(|c| input_len(c) >= MIN_UPDATE_CHARS)
            .map(str::to_owned)
            .ok_or(ValidationError::ContentTooShort)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rsvp(name: &str, email: &str, response: &str) -> RsvpForm {
        RsvpForm {
            name: Some(name.to_owned()),
            email: Some(email.to_owned()),
            response: Some(response.to_owned()),
            ..RsvpForm::default()
        }
    }

    #[test]
    fn rsvp_is_trimmed_and_email_lowercased() {
        let mut form = rsvp("  Ada Lovelace ", " Ada@Example.COM ", "maybe");
        form.phone = Some("   ".to_owned());
        form.message = Some(" See you! ".to_owned());

        let ok = form.validate().unwrap();
        assert_eq!(ok.guest_name, "Ada Lovelace");
        assert_eq!(ok.guest_email, "ada@example.com");
        assert_eq!(ok.guest_phone, None);
        assert_eq!(ok.response, Attendance::Maybe);
        assert_eq!(ok.message.as_deref(), Some("See you!"));
    }

    #[test]
    fn short_or_missing_name_is_rejected() {
        assert_eq!(
            rsvp(" A ", "a@b.c", "yes").validate(),
            Err(ValidationError::InvalidName)
        );
        let form = RsvpForm {
            email: Some("a@b.c".to_owned()),
            response: Some("yes".to_owned()),
            ..RsvpForm::default()
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidName));
    }

    #[test]
    fn name_is_checked_before_email() {
        assert_eq!(
            rsvp("A", "not-an-email", "nope").validate(),
            Err(ValidationError::InvalidName)
        );
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert_eq!(
            rsvp("Ada", "ada.example.com", "yes").validate(),
            Err(ValidationError::InvalidEmail)
        );
    }

    #[test]
    fn response_must_be_exact() {
        for bad in ["Yes", "y", "", "attending"] {
            assert_eq!(
                rsvp("Ada", "a@b.c", bad).validate(),
                Err(ValidationError::InvalidResponse),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn lengths_count_utf16_units() {
        assert!(rsvp("Zoë", "z@x.y", "no").validate().is_ok());
        assert!(rsvp("李", "l@x.y", "no").validate().is_err());
        // Outside the BMP: one character, two units.
        assert!(rsvp("😀", "e@x.y", "no").validate().is_ok());

        let form = AdminForm {
            content: Some("🎉🎉🎉".to_owned()),
            ..AdminForm::default()
        };
        assert_eq!(form.update_content().unwrap(), "🎉🎉🎉");
        let form = AdminForm {
            content: Some("🎉🎉".to_owned()),
            ..AdminForm::default()
        };
        assert_eq!(form.update_content(), Err(ValidationError::ContentTooShort));
    }

    #[test]
    fn admin_action_parses() {
        let mut form = AdminForm::default();
        assert_eq!(form.action(), Err(ValidationError::InvalidAction));
        form.action = Some("post_update".to_owned());
        assert_eq!(form.action(), Ok(AdminAction::PostUpdate));
        form.action = Some("delete_everything".to_owned());
        assert_eq!(form.action(), Err(ValidationError::InvalidAction));
    }

    #[test]
    fn event_changes_treat_checkbox_presence_as_true() {
        let form = AdminForm {
            name: Some(" Garden Party ".to_owned()),
            date: Some("2025-06-14".to_owned()),
            time: Some(" 6pm ".to_owned()),
            location: Some(String::new()),
            accepting_rsvps: Some(String::new()),
            ..AdminForm::default()
        };
        let changes = form.event_changes().unwrap();
        assert_eq!(changes.name, "Garden Party");
        assert_eq!(changes.date, NaiveDate::from_ymd_opt(2025, 6, 14));
        assert_eq!(changes.time.as_deref(), Some("6pm"));
        assert_eq!(changes.location, None);
        assert_eq!(changes.description, None);
        assert!(changes.accepting_rsvps);
        assert!(!changes.is_public);
    }

    #[test]
    fn empty_date_keeps_stored_date_and_bad_date_is_rejected() {
        let mut form = AdminForm {
            name: Some("Party".to_owned()),
            date: Some(String::new()),
            ..AdminForm::default()
        };
        assert_eq!(form.event_changes().unwrap().date, None);

        form.date = Some("14/06/2025".to_owned());
        assert!(matches!(
            form.event_changes(),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn short_event_name_is_rejected() {
        let form = AdminForm {
            name: Some("X".to_owned()),
            ..AdminForm::default()
        };
        assert_eq!(form.event_changes(), Err(ValidationError::InvalidEventName));
    }

    #[test]
    fn update_content_needs_five_characters() {
        let mut form = AdminForm {
            content: Some("  hey  ".to_owned()),
            ..AdminForm::default()
        };
        assert_eq!(form.update_content(), Err(ValidationError::ContentTooShort));
        form.content = Some(" Doors open at 7 ".to_owned());
        assert_eq!(form.update_content().unwrap(), "Doors open at 7");
    }
}
