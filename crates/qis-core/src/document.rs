//! Reading QIS room schedule pages
//!
//! Extracts the timetable rows, the room name and the week number from
//! the page markup. Cells are classified here, once, so the normalizer
//! never has to look at markup again.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::grid::{Anchor, CellKind, GridCell, GridRow};
use crate::{Error, Result};

/// Class of table cells that may hold a booking
pub const RESERVATION_CLASS: &str = "plan2";

const ROOM_SELECTOR: &str = "div#wrapper div.divcontent div.content_max form.form table tr td h4 a.nav";
const WEEK_SELECTOR: &str = "div#wrapper div.divcontent div.content_max table.normal tr td.menu1_on fieldset form.form b";
// html5ever inserts the tbody that QIS leaves out
const ROW_SELECTOR: &str = "div#wrapper > div.divcontent > div.content_max > form.form > table > tbody > tr, \
                            div#wrapper > div.divcontent > div.content_max > form.form > table > tr";
const DATE_SELECTOR: &str = "div.klein";
const TIME_LABEL_SELECTOR: &str = "span.normal";
const ANCHOR_SELECTOR: &str = "table td a.ver";

/// The parts of a schedule page the parser works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableDocument {
    pub room_name: String,
    pub week: u32,
    pub rows: Vec<GridRow>,
}

struct Selectors {
    room: Selector,
    week: Selector,
    rows: Selector,
    date: Selector,
    time_label: Selector,
    anchor: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            room: compile(ROOM_SELECTOR)?,
            week: compile(WEEK_SELECTOR)?,
            rows: compile(ROW_SELECTOR)?,
            date: compile(DATE_SELECTOR)?,
            time_label: compile(TIME_LABEL_SELECTOR)?,
            anchor: compile(ANCHOR_SELECTOR)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

impl TimetableDocument {
    /// Parse a schedule page
    pub fn parse(html: &str) -> Result<Self> {
        let selectors = Selectors::new()?;
        let document = Html::parse_document(html);

        let room_name = document
            .select(&selectors.room)
            .next()
            .map(|el| normalized_text(&el))
            .unwrap_or_default();
        if room_name.is_empty() {
            warn!("Schedule page has no room name");
        }

        let week = parse_week(&document, &selectors)?;

        let rows = document
            .select(&selectors.rows)
            .map(|row| read_row(&row, &selectors))
            .collect::<Result<Vec<_>>>()?;
        if rows.is_empty() {
            return Err(Error::MalformedTable("timetable not found".to_string()));
        }

        debug!(room = %room_name, week, rows = rows.len(), "Read timetable");

        Ok(Self { room_name, week, rows })
    }
}

fn parse_week(document: &Html, selectors: &Selectors) -> Result<u32> {
    let text = document
        .select(&selectors.week)
        .next()
        .map(|el| normalized_text(&el))
        .ok_or_else(|| Error::MalformedTable("week number not found".to_string()))?;

    // e.g. "KW 07 (12.02.2024 - 18.02.2024)"
    text.split_whitespace()
        .nth(1)
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| Error::MalformedTable(format!("no week number in {:?}", text)))
}

fn read_row(row: &ElementRef, selectors: &Selectors) -> Result<GridRow> {
    let mut grid_row = GridRow::default();

    for child in row.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "th" => grid_row.headers.push(header_text(&child, selectors)),
            "td" => {
                let apparent = grid_row.cells.len();
                grid_row.cells.push(read_cell(&child, apparent, selectors)?);
            }
            _ => {}
        }
    }

    Ok(grid_row)
}

fn header_text(cell: &ElementRef, selectors: &Selectors) -> String {
    cell.select(&selectors.date)
        .next()
        .map(|date| normalized_text(&date))
        .unwrap_or_else(|| normalized_text(cell))
}

fn read_cell(cell: &ElementRef, apparent: usize, selectors: &Selectors) -> Result<GridCell> {
    let rowspan = match cell.value().attr("rowspan") {
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::MalformedTable(format!("invalid rowspan {:?}", value)))?,
        None => 1,
    };

    let kind = if apparent == 0 {
        let label = cell
            .select(&selectors.time_label)
            .map(|span| normalized_text(&span))
            .collect::<Vec<_>>()
            .join(" ");
        CellKind::TimeAxis { label }
    } else if cell.value().classes().any(|class| class == RESERVATION_CLASS) {
        CellKind::Reservation {
            anchor: cell.select(&selectors.anchor).next().map(|a| read_anchor(&a)),
        }
    } else {
        CellKind::Other
    };

    Ok(GridCell::new(rowspan, kind))
}

fn read_anchor(anchor: &ElementRef) -> Anchor {
    let title = anchor
        .value()
        .attr("title")
        .map(str::trim)
        .map(str::to_string)
        .unwrap_or_else(|| normalized_text(anchor));
    let href = anchor.value().attr("href").unwrap_or_default().trim().to_string();

    Anchor { title, href }
}

/// Text content with runs of whitespace collapsed
fn normalized_text(element: &ElementRef) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}
