//! Parsed schedule of one room for one week

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::config::GridLayout;
use crate::document::TimetableDocument;
use crate::grid;
use crate::models::Reservation;
use crate::Result;

/// Reservations of one room in one week, in table scan order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub room_name: String,
    pub week: u32,
    pub reservations: Vec<Reservation>,
}

impl Schedule {
    /// Parse a schedule page with the standard QIS grid layout
    pub fn parse(html: &str) -> Result<Self> {
        Self::parse_with_layout(html, GridLayout::default())
    }

    /// Parse a schedule page
    ///
    /// Fails on the first malformed element; no partial schedule is
    /// returned.
    pub fn parse_with_layout(html: &str, layout: GridLayout) -> Result<Self> {
        let document = TimetableDocument::parse(html)?;
        let reservations = grid::normalize(&document.rows, layout)?;

        info!(
            room = %document.room_name,
            week = document.week,
            reservations = reservations.len(),
            "Parsed room schedule"
        );

        Ok(Self {
            room_name: document.room_name,
            week: document.week,
            reservations,
        })
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, reservation) in self.reservations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", reservation)?;
        }
        Ok(())
    }
}
