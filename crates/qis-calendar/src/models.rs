//! Calendar event model

use chrono::NaiveDateTime;
use icalendar::{Component, Event, EventLike};
use qis_core::Reservation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Calendar event for one reservation
///
/// Times are floating local times: QIS shows the wall-clock time of the
/// university and carries no time zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Stable identifier, the same for the same booking on every export
    pub uid: String,
    /// Event summary/title
    pub summary: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Link to the course in QIS
    #[serde(default)]
    pub url: Option<String>,
    /// Room name
    #[serde(default)]
    pub location: Option<String>,
}

impl CalendarEvent {
    pub fn new(summary: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let summary = summary.into();
        Self {
            uid: event_uid(&summary, start),
            summary,
            start,
            end,
            url: None,
            location: None,
        }
    }

    /// Event for a reservation in `room`
    pub fn from_reservation(reservation: &Reservation, room: &str) -> Self {
        let mut event = Self::new(reservation.title.clone(), reservation.start, reservation.end)
            .with_uid(event_uid(&reservation.href, reservation.start));
        if !reservation.href.is_empty() {
            event = event.with_url(reservation.href.clone());
        }
        if !room.is_empty() {
            event = event.with_location(room);
        }
        event
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Convert to an iCalendar `VEVENT`
    pub fn to_ical_event(&self) -> Event {
        let mut event = Event::new();
        event
            .uid(&self.uid)
            .summary(&self.summary)
            .starts(self.start)
            .ends(self.end);
        if let Some(url) = &self.url {
            event.url(url);
        }
        if let Some(location) = &self.location {
            event.location(location);
        }
        event.done()
    }
}

/// UUID v5 of `key` and `start`
fn event_uid(key: &str, start: NaiveDateTime) -> String {
    let name = format!("{}@{}", key, start.format("%Y%m%dT%H%M%S"));
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
}
