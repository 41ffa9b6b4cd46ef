//! Time-axis resolution
//!
//! The leading column of every timetable row carries the time the row
//! starts at. Only full hours are labelled; the rows in between are blank
//! and advance the previous time by one slot. The first and last labels
//! read `vor 8` ("before 8") and `ab 20` ("from 20 on").

use regex::Regex;

use crate::models::TimeCursor;
use crate::{Error, Result};

const BEFORE_HOUR: &str = r"^(?:vor|before)\s+([0-9]{1,2})";
const AFTER_HOUR: &str = r"^(?:ab|after)\s+([0-9]{1,2})";

/// Turns time-axis labels into the start time of their row
#[derive(Debug, Clone)]
pub struct TimeAxisResolver {
    before: Regex,
    after: Regex,
    slot_minutes: u32,
}

impl TimeAxisResolver {
    pub fn new(slot_minutes: u32) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::Config(format!("Invalid time label pattern: {}", e)))
        };

        Ok(Self {
            before: compile(BEFORE_HOUR)?,
            after: compile(AFTER_HOUR)?,
            slot_minutes,
        })
    }

    /// Resolve `label` relative to the cursor of the previous row.
    pub fn resolve(&self, label: &str, previous: TimeCursor) -> Result<TimeCursor> {
        let label = label.trim();

        if label.is_empty() {
            let minute = previous.minute + self.slot_minutes;
            if minute >= 60 {
                return Err(Error::TimeAxisOverflow {
                    hour: previous.hour,
                    minute: previous.minute,
                });
            }
            return Ok(TimeCursor::new(previous.hour, minute));
        }

        let hour = if let Some(hour) = Self::capture_hour(&self.before, label) {
            hour.checked_sub(1)
                .ok_or_else(|| Error::MalformedTimeLabel(label.to_string()))?
        } else if let Some(hour) = Self::capture_hour(&self.after, label) {
            hour
        } else {
            label
                .parse::<u32>()
                .map_err(|_| Error::MalformedTimeLabel(label.to_string()))?
        };

        if hour > 23 {
            return Err(Error::MalformedTimeLabel(label.to_string()));
        }

        Ok(TimeCursor::new(hour, 0))
    }

    fn capture_hour(pattern: &Regex, label: &str) -> Option<u32> {
        pattern
            .captures(label)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TimeAxisResolver {
        TimeAxisResolver::new(15).unwrap()
    }

    #[test]
    fn test_blank_advances_one_slot() {
        let resolver = resolver();
        let cursor = resolver.resolve("", TimeCursor::new(10, 0)).unwrap();
        assert_eq!(cursor, TimeCursor::new(10, 15));

        let cursor = resolver.resolve(" \u{a0} ", cursor).unwrap();
        assert_eq!(cursor, TimeCursor::new(10, 30));
    }

    #[test]
    fn test_before_hour() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("before 10", TimeCursor::default()).unwrap(), TimeCursor::new(9, 0));
        assert_eq!(resolver.resolve("vor 8", TimeCursor::default()).unwrap(), TimeCursor::new(7, 0));
    }

    #[test]
    fn test_after_hour() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("after 10", TimeCursor::default()).unwrap(), TimeCursor::new(10, 0));
        assert_eq!(resolver.resolve("ab  20", TimeCursor::default()).unwrap(), TimeCursor::new(20, 0));
    }

    #[test]
    fn test_literal_hour_resets_minute() {
        let resolver = resolver();
        let cursor = resolver.resolve("10", TimeCursor::new(9, 45)).unwrap();
        assert_eq!(cursor, TimeCursor::new(10, 0));
    }

    #[test]
    fn test_unknown_label() {
        let resolver = resolver();
        let result = resolver.resolve("noon", TimeCursor::default());
        assert!(matches!(result, Err(Error::MalformedTimeLabel(ref s)) if s == "noon"));
    }

    #[test]
    fn test_hour_out_of_range() {
        let resolver = resolver();
        assert!(matches!(resolver.resolve("vor 0", TimeCursor::default()), Err(Error::MalformedTimeLabel(_))));
        assert!(matches!(resolver.resolve("24", TimeCursor::default()), Err(Error::MalformedTimeLabel(_))));
    }

    #[test]
    fn test_continuation_past_the_hour_is_reported() {
        let resolver = resolver();
        let result = resolver.resolve("", TimeCursor::new(10, 45));
        assert!(matches!(result, Err(Error::TimeAxisOverflow { hour: 10, minute: 45 })));
    }
}
