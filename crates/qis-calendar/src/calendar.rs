//! Calendar construction and file output

use std::path::Path;

use icalendar::{Calendar, Property};
use qis_core::{OutputConfig, Schedule};
use tracing::{debug, info};

use crate::error::{CalendarError, Result};
use crate::models::CalendarEvent;

/// Build one calendar holding the reservations of all `schedules`
pub fn build_calendar(schedules: &[Schedule], config: &OutputConfig) -> Calendar {
    let mut calendar = Calendar::empty();
    calendar
        .append_property(Property::new("VERSION", "2.0"))
        .append_property(Property::new("PRODID", &config.product_id))
        .append_property(Property::new("CALSCALE", "GREGORIAN"));
    if let Some(name) = &config.calendar_name {
        calendar.name(name);
    }

    for schedule in schedules {
        debug!(
            room = %schedule.room_name,
            week = schedule.week,
            events = schedule.len(),
            "Adding schedule to calendar"
        );
        for reservation in &schedule.reservations {
            let event = CalendarEvent::from_reservation(reservation, &schedule.room_name);
            calendar.push(event.to_ical_event());
        }
    }

    calendar.done()
}

/// Write `calendar` to `path`, replacing an existing file
pub fn write_calendar(calendar: &Calendar, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, calendar.to_string()).map_err(|source| CalendarError::Write {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), "Wrote calendar");
    Ok(())
}
