//! qis-core: room schedule extraction for HIS-QIS timetables
//!
//! Turns the HTML week view of a QIS room schedule into reservation
//! records. The page renders bookings as row-spanning cells in a
//! quarter-hour grid; this crate reconstructs the date, start and end of
//! every booking from that grid.
//!
//! The crate performs no I/O: it takes markup text and returns a
//! [`Schedule`].
//!
//! ```rust,ignore
//! let schedule = qis_core::Schedule::parse(&html)?;
//! for reservation in &schedule.reservations {
//!     println!("{}", reservation);
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod grid;
pub mod models;
pub mod schedule;
pub mod time_axis;

pub use config::{Config, GridLayout, OutputConfig, SourceConfig};
pub use document::TimetableDocument;
pub use error::{Error, Result};
pub use grid::{Anchor, CellKind, GridCell, GridNormalizer, GridRow, ShiftWindow};
pub use models::{Reservation, TimeCursor};
pub use schedule::Schedule;
pub use time_axis::TimeAxisResolver;
