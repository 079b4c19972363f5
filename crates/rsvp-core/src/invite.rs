//! Invitation `mailto:` links.

use chrono::NaiveDate;
use rsvp_storage::Event;

/// Long-form date, e.g. `Saturday, June 14, 2025`.
#[must_use]
pub fn format_event_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// The event fields an invitation mentions.
#[derive(Debug, Clone, Default)]
pub struct InviteDetails<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub date: Option<NaiveDate>,
    pub time: Option<&'a str>,
    pub location: Option<&'a str>,
}

impl<'a> From<&'a Event> for InviteDetails<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            name: &event.name,
            description: event.description.as_deref(),
            date: event.date,
            time: event.time.as_deref(),
            location: event.location.as_deref(),
        }
    }
}

/// Plain-text invitation body. Absent details leave a blank line.
#[must_use]
pub fn invite_body(details: &InviteDetails<'_>, event_url: &str) -> String {
    let line = |label: &str, value: Option<String>| {
        value.map(|v| format!("{label}: {v}")).unwrap_or_default()
    };

    format!(
        "Hi there!\n\n\
         You're invited to {name}!\n\n\
         {details}\n\
         {date}\n\
         {time}\n\
         {location}\n\n\
         Please RSVP here: {event_url}\n\n\
         Looking forward to seeing you there!",
        name = details.name,
        details = line("Details", details.description.map(str::to_owned)),
        date = line("Date", details.date.map(format_event_date)),
        time = line("Time", details.time.map(str::to_owned)),
        location = line("Location", details.location.map(str::to_owned)),
    )
}

/// Build a `mailto:` link addressed to every email, separated by `;`.
#[must_use]
pub fn invite_mailto<'e>(
    emails: impl IntoIterator<Item = &'e str>,
    details: &InviteDetails<'_>,
    event_url: &str,
) -> String {
    let to = emails.into_iter().collect::<Vec<_>>().join(";");
    let subject = format!("You're invited to {}", details.name);
    let body = invite_body(details, event_url);

    format!(
        "mailto:{to}?subject={}&body={}",
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}
