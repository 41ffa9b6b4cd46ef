//! Grid normalization
//!
//! QIS renders a room week as one big table: one row per slot, one column
//! per day, and a booking as a single cell with `rowspan` covering its
//! slots. Because a spanning cell only appears in the markup of its first
//! row, every later row it covers is missing a cell, and the markup index
//! of the remaining cells no longer matches the day they belong to.
//!
//! [`ShiftWindow`] keeps, for each upcoming row, how far each markup index
//! has to be moved right. [`GridNormalizer`] walks the rows, keeps the
//! window in step, resolves the time axis and emits the reservations.

use std::collections::VecDeque;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::GridLayout;
use crate::models::{Reservation, TimeCursor};
use crate::time_axis::TimeAxisResolver;
use crate::{Error, Result};

/// Date format of the header cells (`01.02.2024`)
pub const HEADER_DATE_FORMAT: &str = "%d.%m.%Y";

/// Booking link found inside a reservation cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub title: String,
    pub href: String,
}

/// What a data cell stands for, decided once when the cell is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    /// Leading cell of a row with its time label
    TimeAxis { label: String },
    /// Cell marked as able to hold a booking; empty slots carry no anchor
    Reservation { anchor: Option<Anchor> },
    /// Spacer or decoration
    Other,
}

/// A data cell in markup order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// Number of rows the cell covers, at least 1
    pub rowspan: usize,
    pub kind: CellKind,
}

impl GridCell {
    pub fn new(rowspan: usize, kind: CellKind) -> Self {
        Self {
            rowspan: rowspan.max(1),
            kind,
        }
    }

    pub fn time_axis(label: impl Into<String>) -> Self {
        Self::new(1, CellKind::TimeAxis { label: label.into() })
    }

    pub fn reservation(rowspan: usize, title: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(
            rowspan,
            CellKind::Reservation {
                anchor: Some(Anchor {
                    title: title.into(),
                    href: href.into(),
                }),
            },
        )
    }

    pub fn empty_slot(rowspan: usize) -> Self {
        Self::new(rowspan, CellKind::Reservation { anchor: None })
    }

    pub fn other(rowspan: usize) -> Self {
        Self::new(rowspan, CellKind::Other)
    }
}

/// One `<tr>` of the timetable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRow {
    /// Raw date texts of the header cells
    pub headers: Vec<String>,
    /// Data cells in markup order
    pub cells: Vec<GridCell>,
}

impl GridRow {
    pub fn header(dates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            headers: dates.into_iter().map(Into::into).collect(),
            cells: Vec::new(),
        }
    }

    pub fn data(cells: Vec<GridCell>) -> Self {
        Self {
            headers: Vec::new(),
            cells,
        }
    }
}

/// Sliding window of column shifts for the current and upcoming rows
///
/// Entry `[rn][c]` is how many columns a cell found at markup index `c`
/// in the row `rn` rows ahead must move right. Row 0 is the row being
/// processed; [`ShiftWindow::advance`] drops it once the row is done.
#[derive(Debug, Clone)]
pub struct ShiftWindow {
    rows: VecDeque<Vec<usize>>,
    width: usize,
    lookahead: usize,
}

impl ShiftWindow {
    pub fn new(width: usize, lookahead: usize) -> Self {
        Self {
            rows: VecDeque::with_capacity(lookahead),
            width,
            lookahead,
        }
    }

    /// Grow the window so that it covers `offset` rows ahead
    fn ensure(&mut self, offset: usize) {
        while self.rows.len() <= offset {
            debug!(rows = self.rows.len() + 1, "Growing column shift window");
            self.rows.push_back(vec![0; self.width]);
        }
    }

    /// Make sure the current row has an entry
    pub fn begin_row(&mut self) {
        self.ensure(0);
    }

    /// Shift of markup index `column` in the row `offset` rows ahead
    pub fn shift(&self, offset: usize, column: usize) -> usize {
        self.rows
            .get(offset)
            .and_then(|row| row.get(column))
            .copied()
            .unwrap_or(0)
    }

    /// Actual column of the cell at markup index `apparent` in the current row
    pub fn actual_column(&self, apparent: usize) -> Result<usize> {
        if apparent >= self.width {
            return Err(Error::MalformedTable(format!(
                "row has more than {} cells",
                self.width
            )));
        }

        let actual = apparent + self.shift(0, apparent);
        if actual >= self.width {
            return Err(Error::MalformedTable(format!(
                "cell at index {} lands in column {}, beyond the {} columns of the grid",
                apparent, actual, self.width
            )));
        }
        Ok(actual)
    }

    /// Record that the cell at `actual_column` of the current row covers
    /// `rowspan` rows.
    ///
    /// In every following row it covers, column `actual_column` is gone.
    /// The markup index that used to land there and every index after it
    /// now land where their right neighbour used to, one column further.
    /// Updating left to right reads the neighbour before it changes, so
    /// several spans starting in the same row stack up instead of
    /// overwriting each other.
    pub fn apply_span(&mut self, actual_column: usize, rowspan: usize) -> Result<()> {
        if rowspan > self.lookahead {
            return Err(Error::MalformedTable(format!(
                "rowspan {} exceeds the supported maximum of {}",
                rowspan, self.lookahead
            )));
        }

        for rn in 1..rowspan {
            self.ensure(rn);

            let width = self.width;
            let row = &mut self.rows[rn];
            // first markup index that reaches the spanned column; the
            // shift at `actual_column` itself only equals its offset when
            // all shifts left of it agree
            let first = (0..=actual_column)
                .find(|&cn| cn + row[cn] >= actual_column)
                .unwrap_or(actual_column);
            for cn in first..width {
                let next_shift = if cn + 1 < width { row[cn + 1] } else { 0 };
                row[cn] = row[cn].max(next_shift) + 1;
            }
        }

        Ok(())
    }

    /// Drop the current row and move the window one row down
    pub fn advance(&mut self) {
        self.rows.pop_front();
    }

    /// Number of rows currently tracked
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reconstructs reservations from the rows of a timetable
#[derive(Debug)]
pub struct GridNormalizer {
    layout: GridLayout,
    resolver: TimeAxisResolver,
    window: ShiftWindow,
    dates: Vec<NaiveDate>,
    cursor: TimeCursor,
    reservations: Vec<Reservation>,
}

impl GridNormalizer {
    pub fn new(layout: GridLayout) -> Result<Self> {
        layout.validate()?;

        Ok(Self {
            resolver: TimeAxisResolver::new(layout.slot_minutes)?,
            window: ShiftWindow::new(layout.max_columns, layout.max_row_span),
            dates: Vec::new(),
            cursor: TimeCursor::default(),
            reservations: Vec::new(),
            layout,
        })
    }

    /// Process all rows and return the reservations in table scan order.
    pub fn normalize<'a, I>(mut self, rows: I) -> Result<Vec<Reservation>>
    where
        I: IntoIterator<Item = &'a GridRow>,
    {
        for row in rows {
            self.process_row(row)?;
        }
        Ok(self.reservations)
    }

    fn process_row(&mut self, row: &GridRow) -> Result<()> {
        self.window.begin_row();

        for text in &row.headers {
            self.push_date(text)?;
        }

        for (apparent, cell) in row.cells.iter().enumerate() {
            let actual = self.window.actual_column(apparent)?;
            self.window.apply_span(actual, cell.rowspan)?;

            if apparent == 0 {
                // the leading cell always carries the time label, even when
                // the markup does not mark it as such
                let label = match &cell.kind {
                    CellKind::TimeAxis { label } => label.as_str(),
                    _ => "",
                };
                self.cursor = self.resolver.resolve(label, self.cursor)?;
                continue;
            }

            if let CellKind::Reservation { anchor: Some(anchor) } = &cell.kind {
                let date = self.date_for_column(actual)?;
                let reservation = Reservation::new(
                    date,
                    self.cursor,
                    cell.rowspan,
                    self.layout.slot_minutes,
                    anchor.title.clone(),
                    anchor.href.clone(),
                )?;
                debug!(
                    column = actual,
                    start = %reservation.start,
                    end = %reservation.end,
                    title = %reservation.title,
                    "Found reservation"
                );
                self.reservations.push(reservation);
            }
        }

        self.window.advance();
        Ok(())
    }

    fn push_date(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        let date = NaiveDate::parse_from_str(text, HEADER_DATE_FORMAT).map_err(|source| Error::DateParse {
            text: text.to_string(),
            source,
        })?;
        self.dates.push(date);
        Ok(())
    }

    fn date_for_column(&self, column: usize) -> Result<NaiveDate> {
        column
            .checked_sub(self.layout.date_column_offset)
            .and_then(|index| self.dates.get(index))
            .copied()
            .ok_or_else(|| {
                Error::MalformedTable(format!(
                    "no date header for column {} ({} headers found)",
                    column,
                    self.dates.len()
                ))
            })
    }
}

/// Run the normalizer over `rows` with the given layout.
pub fn normalize(rows: &[GridRow], layout: GridLayout) -> Result<Vec<Reservation>> {
    GridNormalizer::new(layout)?.normalize(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn header() -> GridRow {
        GridRow::header(["01.01.2024", "02.01.2024", "03.01.2024", "04.01.2024", "05.01.2024"])
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    /// Time cell, spacer, then the given day cells
    fn row(label: &str, days: Vec<GridCell>) -> GridRow {
        let mut cells = vec![GridCell::time_axis(label), GridCell::other(1)];
        cells.extend(days);
        GridRow::data(cells)
    }

    #[test]
    fn test_window_starts_without_shift() {
        let mut window = ShiftWindow::new(9, 96);
        window.begin_row();
        assert_eq!(window.len(), 1);
        for c in 0..9 {
            assert_eq!(window.actual_column(c).unwrap(), c);
        }
    }

    #[test]
    fn test_window_single_span() {
        let mut window = ShiftWindow::new(9, 96);
        window.begin_row();
        window.apply_span(3, 3).unwrap();
        assert_eq!(window.len(), 3);

        window.advance();
        // column 3 is taken: indices 0..3 stay, 3.. move right by one
        assert_eq!(window.actual_column(2).unwrap(), 2);
        assert_eq!(window.actual_column(3).unwrap(), 4);
        assert_eq!(window.actual_column(7).unwrap(), 8);
    }

    #[test]
    fn test_window_spans_compose() {
        let mut window = ShiftWindow::new(9, 96);
        window.begin_row();
        window.apply_span(2, 2).unwrap();
        window.apply_span(3, 3).unwrap();
        window.apply_span(5, 2).unwrap();

        window.advance();
        let columns: Vec<usize> = (0..4).map(|c| window.actual_column(c).unwrap()).collect();
        assert_eq!(columns, vec![0, 1, 4, 6]);

        window.advance();
        let columns: Vec<usize> = (0..5).map(|c| window.actual_column(c).unwrap()).collect();
        assert_eq!(columns, vec![0, 1, 2, 4, 5]);
    }

    #[test]
    fn test_window_span_after_uneven_shift() {
        let mut window = ShiftWindow::new(9, 96);

        // 08:00 Mon (col 2) for four rows, Wed (col 4) for two
        window.begin_row();
        window.apply_span(2, 4).unwrap();
        window.apply_span(4, 2).unwrap();
        window.advance();

        // 08:15 markup index 3 is Thursday, spanning three rows
        assert_eq!(window.actual_column(3).unwrap(), 5);
        window.apply_span(5, 3).unwrap();
        window.advance();

        // 08:30 Wednesday is free again and starts a two row span
        assert_eq!(window.actual_column(2).unwrap(), 3);
        assert_eq!(window.actual_column(3).unwrap(), 4);
        window.apply_span(4, 2).unwrap();
        window.advance();

        // 08:45 Mon, Wed and Thu are taken: Tuesday, then Friday
        assert_eq!(window.actual_column(2).unwrap(), 3);
        assert_eq!(window.actual_column(3).unwrap(), 6);
        assert_eq!(window.actual_column(4).unwrap(), 7);
    }

    #[test]
    fn test_window_rejects_wide_rows() {
        let mut window = ShiftWindow::new(9, 96);
        window.begin_row();
        assert!(matches!(window.actual_column(9), Err(Error::MalformedTable(_))));

        window.apply_span(8, 2).unwrap();
        window.advance();
        assert!(matches!(window.actual_column(8), Err(Error::MalformedTable(_))));
    }

    #[test]
    fn test_window_rejects_long_span() {
        let mut window = ShiftWindow::new(9, 4);
        window.begin_row();
        assert!(window.apply_span(0, 4).is_ok());
        assert!(matches!(window.apply_span(0, 5), Err(Error::MalformedTable(_))));
    }

    #[test]
    fn test_single_row_without_spans() {
        let rows = vec![
            header(),
            row(
                "8",
                vec![
                    GridCell::reservation(1, "A", "/a"),
                    GridCell::empty_slot(1),
                    GridCell::reservation(1, "C", "/c"),
                    GridCell::other(1),
                    GridCell::reservation(1, "E", "/e"),
                ],
            ),
        ];

        let reservations = normalize(&rows, GridLayout::default()).unwrap();
        assert_eq!(reservations.len(), 3);
        for r in &reservations {
            assert_eq!(r.duration(), Duration::minutes(15));
        }
        assert_eq!(reservations[0].start, at(1, 8, 0));
        assert_eq!(reservations[1].start, at(3, 8, 0));
        assert_eq!(reservations[2].start, at(5, 8, 0));
    }

    #[test]
    fn test_date_taken_from_actual_column() {
        let rows = vec![
            header(),
            row(
                "10",
                vec![GridCell::empty_slot(1), GridCell::reservation(2, "Math101", "/x/1")],
            ),
        ];

        let reservations = normalize(&rows, GridLayout::default()).unwrap();
        assert_eq!(reservations.len(), 1);
        // markup index 3, two leading columns: header index 1
        assert_eq!(reservations[0].start, at(2, 10, 0));
        assert_eq!(reservations[0].end, at(2, 10, 30));
        assert_eq!(reservations[0].title, "Math101");
        assert_eq!(reservations[0].href, "/x/1");
    }

    #[test]
    fn test_spanned_cell_moves_later_cells() {
        let rows = vec![
            header(),
            row(
                "9",
                vec![
                    GridCell::reservation(4, "Long", "/long"),
                    GridCell::empty_slot(1),
                    GridCell::empty_slot(1),
                ],
            ),
            // Monday is still occupied: the first day cell belongs to Tuesday
            row("", vec![GridCell::reservation(1, "Tue", "/tue"), GridCell::empty_slot(1)]),
            row("", vec![GridCell::empty_slot(1), GridCell::reservation(2, "Wed", "/wed")]),
            // Wednesday is occupied now as well
            row("", vec![GridCell::reservation(1, "Tue2", "/tue2"), GridCell::reservation(1, "Thu", "/thu")]),
            row("10", vec![GridCell::reservation(1, "Mon", "/mon")]),
        ];

        let reservations = normalize(&rows, GridLayout::default()).unwrap();
        let summary: Vec<(&str, NaiveDateTime, NaiveDateTime)> = reservations
            .iter()
            .map(|r| (r.title.as_str(), r.start, r.end))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Long", at(1, 9, 0), at(1, 10, 0)),
                ("Tue", at(2, 9, 15), at(2, 9, 30)),
                ("Wed", at(3, 9, 30), at(3, 10, 0)),
                ("Tue2", at(2, 9, 45), at(2, 10, 0)),
                ("Thu", at(4, 9, 45), at(4, 10, 0)),
                ("Mon", at(1, 10, 0), at(1, 10, 15)),
            ]
        );
    }

    #[test]
    fn test_adjacent_spans_never_share_a_column() {
        // two neighbours with different lengths starting in the same row
        let rows = vec![
            header(),
            row(
                "14",
                vec![
                    GridCell::reservation(2, "Short", "/s"),
                    GridCell::reservation(3, "Long", "/l"),
                    GridCell::empty_slot(1),
                ],
            ),
            row("", vec![GridCell::reservation(1, "Wed", "/w"), GridCell::reservation(1, "Thu", "/t")]),
            row(
                "",
                vec![
                    GridCell::reservation(1, "Mon", "/m"),
                    GridCell::reservation(1, "Wed2", "/w2"),
                    GridCell::reservation(1, "Thu2", "/t2"),
                ],
            ),
        ];

        let reservations = normalize(&rows, GridLayout::default()).unwrap();
        let starts: Vec<(&str, NaiveDateTime)> = reservations.iter().map(|r| (r.title.as_str(), r.start)).collect();
        assert_eq!(
            starts,
            vec![
                ("Short", at(1, 14, 0)),
                ("Long", at(2, 14, 0)),
                ("Wed", at(3, 14, 15)),
                ("Thu", at(4, 14, 15)),
                ("Mon", at(1, 14, 30)),
                ("Wed2", at(3, 14, 30)),
                ("Thu2", at(4, 14, 30)),
            ]
        );
    }

    #[test]
    fn test_malformed_time_label_yields_nothing() {
        let rows = vec![
            header(),
            row("8", vec![GridCell::reservation(1, "A", "/a")]),
            row("noon", vec![GridCell::reservation(1, "B", "/b")]),
        ];

        let result = normalize(&rows, GridLayout::default());
        assert!(matches!(result, Err(Error::MalformedTimeLabel(ref s)) if s == "noon"));
    }

    #[test]
    fn test_bad_header_date() {
        let rows = vec![GridRow::header(["Montag"])];
        let result = normalize(&rows, GridLayout::default());
        assert!(matches!(result, Err(Error::DateParse { ref text, .. }) if text == "Montag"));
    }

    #[test]
    fn test_reservation_without_header() {
        let rows = vec![
            GridRow::header(["01.01.2024"]),
            row("8", vec![GridCell::empty_slot(1), GridCell::reservation(1, "Tue", "/t")]),
        ];
        let result = normalize(&rows, GridLayout::default());
        assert!(matches!(result, Err(Error::MalformedTable(_))));
    }

    #[test]
    fn test_row_wider_than_layout() {
        let cells = (0..8).map(|_| GridCell::empty_slot(1)).collect();
        let rows = vec![header(), row("8", cells)];
        let result = normalize(&rows, GridLayout::default());
        assert!(matches!(result, Err(Error::MalformedTable(_))));
    }

    #[test]
    fn test_custom_date_offset() {
        let layout = GridLayout {
            date_column_offset: 1,
            ..GridLayout::default()
        };
        let rows = vec![
            header(),
            GridRow::data(vec![GridCell::time_axis("12"), GridCell::reservation(1, "Mon", "/m")]),
        ];
        let reservations = normalize(&rows, layout).unwrap();
        assert_eq!(reservations[0].start, at(1, 12, 0));
    }
}
