//! End-to-end parsing of a complete room week page

use chrono::{NaiveDate, NaiveDateTime};
use qis_core::{Error, GridLayout, Schedule};

const ROOM_WEEK: &str = include_str!("fixtures/room_week.html");

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[test]
fn test_room_week_metadata() {
    let schedule = Schedule::parse(ROOM_WEEK).unwrap();
    assert_eq!(schedule.room_name, "F 102 - Seminarraum");
    assert_eq!(schedule.week, 7);
    assert_eq!(schedule.len(), 7);
}

#[test]
fn test_room_week_reservations() {
    let schedule = Schedule::parse(ROOM_WEEK).unwrap();
    let found: Vec<_> = schedule
        .reservations
        .iter()
        .map(|r| (r.title.as_str(), r.start, r.end))
        .collect();

    assert_eq!(
        found,
        vec![
            ("Algebra I", at(12, 8, 0), at(12, 9, 0)),
            ("Physik", at(14, 8, 0), at(14, 8, 30)),
            ("Chemie", at(15, 8, 15), at(15, 9, 0)),
            ("Seminar", at(14, 8, 30), at(14, 9, 0)),
            ("Tutorium", at(13, 8, 45), at(13, 9, 0)),
            ("Kolloquium", at(16, 9, 0), at(16, 9, 15)),
            ("Abendkurs", at(12, 20, 0), at(12, 20, 30)),
        ]
    );
}

#[test]
fn test_hrefs_are_decoded() {
    let schedule = Schedule::parse(ROOM_WEEK).unwrap();
    assert_eq!(
        schedule.reservations[0].href,
        "/qisserver/rds?state=verpublish&publishid=101"
    );
}

#[test]
fn test_bookings_on_one_day_never_overlap() {
    let schedule = Schedule::parse(ROOM_WEEK).unwrap();

    for a in &schedule.reservations {
        for b in &schedule.reservations {
            if a == b || a.start.date() != b.start.date() {
                continue;
            }
            assert!(
                a.end <= b.start || b.end <= a.start,
                "{} overlaps {}",
                a,
                b
            );
        }
    }
}

#[test]
fn test_narrow_layout_rejects_the_page() {
    let layout = GridLayout {
        max_columns: 6,
        ..GridLayout::default()
    };
    let result = Schedule::parse_with_layout(ROOM_WEEK, layout);
    assert!(matches!(result, Err(Error::MalformedTable(_))));
}

#[test]
fn test_unknown_time_label_fails_the_whole_page() {
    let html = ROOM_WEEK.replace(r#"<span class="normal">9</span>"#, r#"<span class="normal">Mittag</span>"#);
    let result = Schedule::parse(&html);
    assert!(matches!(result, Err(Error::MalformedTimeLabel(ref label)) if label == "Mittag"));
}

#[test]
fn test_invalid_header_date_fails_the_whole_page() {
    let html = ROOM_WEEK.replace("14.02.2024", "14.13.2024");
    let result = Schedule::parse(&html);
    assert!(matches!(result, Err(Error::DateParse { ref text, .. }) if text == "14.13.2024"));
}
