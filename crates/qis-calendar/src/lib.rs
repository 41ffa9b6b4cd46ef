//! qis-calendar: iCalendar output for room schedules
//!
//! Every reservation becomes one event; the schedules of several rooms or
//! weeks merge into one calendar.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qis_calendar::{build_calendar, write_calendar};
//!
//! let schedule = qis_core::Schedule::parse(&html)?;
//! let calendar = build_calendar(&[schedule], &config.output);
//! write_calendar(&calendar, &config.output.path)?;
//! ```

pub mod calendar;
pub mod error;
pub mod models;

pub use calendar::{build_calendar, write_calendar};
pub use error::{CalendarError, Result};
pub use models::CalendarEvent;
