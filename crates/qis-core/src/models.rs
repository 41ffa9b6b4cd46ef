//! Data models for parsed room schedules

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// One booking of the room, recovered from a single grid cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Start of the booking (local time of the timetable)
    pub start: NaiveDateTime,
    /// End of the booking, `start + slot length × rowspan`
    pub end: NaiveDateTime,
    /// Title attribute of the booking link
    pub title: String,
    /// Link to the event details
    pub href: String,
}

impl Reservation {
    /// Build a reservation starting at `cursor` on `date` and covering
    /// `rowspan` rows of `slot_minutes` each.
    pub fn new(
        date: NaiveDate,
        cursor: TimeCursor,
        rowspan: usize,
        slot_minutes: u32,
        title: impl Into<String>,
        href: impl Into<String>,
    ) -> Result<Self> {
        let start = date.and_time(cursor.to_time()?);
        let length = Duration::minutes(i64::from(slot_minutes) * rowspan as i64);

        Ok(Self {
            start,
            end: start + length,
            title: title.into(),
            href: href.into(),
        })
    }

    /// Length of the booking
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}: {}", self.start, self.end, self.title)
    }
}

/// The time associated with the table row currently being scanned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeCursor {
    pub hour: u32,
    pub minute: u32,
}

impl TimeCursor {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Convert to a wall-clock time, failing for out-of-range values
    pub fn to_time(self) -> Result<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).ok_or(Error::TimeAxisOverflow {
            hour: self.hour,
            minute: self.minute,
        })
    }
}

impl fmt::Display for TimeCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
