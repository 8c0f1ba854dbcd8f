//! Tests for the CDEC daily storage parser

use super::*;
use crate::Error;
use crate::app::services::text_parser::parse_water_levels;
use chrono::NaiveDate;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn test_missing_marker_is_dropped_not_zeroed() {
    let raw = "'metadata line\nID,X,2015,6,100,m,102";

    let result = parse_water_levels(raw, "ID").unwrap();

    let pairs: Vec<(NaiveDate, f64)> = result.points.iter().map(|p| (p.date, p.value)).collect();
    assert_eq!(
        pairs,
        vec![(date(2015, 6, 1), 100.0), (date(2015, 6, 3), 102.0)]
    );
    assert_eq!(result.stats.missing_values, 1);
    assert_eq!(result.stats.records_skipped, 0);
}

#[test]
fn test_multi_month_payload() {
    let result = parse_water_levels(&create_test_water_level_payload(), "SHA").unwrap();

    assert_eq!(result.points.len(), 5);
    assert_eq!(result.points[0].date, date(2015, 6, 1));
    assert_eq!(result.points[2].date, date(2015, 6, 4));
    assert_eq!(result.points[2].value, 3970.0);
    assert_eq!(result.points[4].date, date(2015, 7, 3));
    assert_eq!(result.stats.total_records, 2);
    assert_eq!(result.stats.points_parsed, 5);
}

#[test]
fn test_metadata_only_payload_fails() {
    let raw = "'Station SHA\n'No data available for this range";

    let result = parse_water_levels(raw, "SHA");

    match result.unwrap_err() {
        Error::Parse { context, message } => {
            assert_eq!(context, "SHA");
            assert_eq!(message, "no usable data");
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_all_missing_values_fails() {
    let raw = "SHA,15,2015,6,m,m,m";
    assert!(matches!(
        parse_water_levels(raw, "SHA"),
        Err(Error::Parse { .. })
    ));
}

#[test]
fn test_short_line_is_skipped() {
    let raw = "SHA,15,2015\nSHA,15,2015,6,100";

    let result = parse_water_levels(raw, "SHA").unwrap();

    assert_eq!(result.points.len(), 1);
    assert_eq!(result.stats.records_skipped, 1);
    assert!(result.stats.errors[0].contains("expected at least 5 columns"));
}

#[test]
fn test_invalid_cells_are_skipped() {
    // Day 2 is not an integer, day 31 does not exist in June
    let mut raw = String::from("SHA,15,2015,6,100,abc");
    for _ in 3..=30 {
        raw.push_str(",m");
    }
    raw.push_str(",999");

    let result = parse_water_levels(&raw, "SHA").unwrap();

    assert_eq!(result.points.len(), 1);
    assert_eq!(result.stats.records_skipped, 2);
    assert!(result.stats.errors.iter().any(|e| e.contains("invalid date")));
}

#[test]
fn test_bad_year_skips_line() {
    let raw = "SHA,15,year,6,100\nSHA,15,2016,1,7";

    let result = parse_water_levels(raw, "SHA").unwrap();

    assert_eq!(result.points.len(), 1);
    assert_eq!(result.points[0].date, date(2016, 1, 1));
    assert_eq!(result.points[0].value, 7.0);
}

#[test]
fn test_whitespace_and_trailing_comma() {
    let raw = "SHA, 15, 2015, 6, 100 , 101,";

    let result = parse_water_levels(raw, "SHA").unwrap();

    assert_eq!(result.points.len(), 2);
    assert_eq!(result.points[1].value, 101.0);
    assert_eq!(result.stats.missing_values, 1);
}
