//! CDEC daily storage export parser
//!
//! Each data line covers one station-month:
//!
//! ```text
//! 'Station SHA, sensor 15, daily         <- metadata, skipped
//! SHA,15,2015,6,4012345,m,4011002,...    <- id, sensor, year, month, day 1, day 2, ...
//! ```
//!
//! Daily values are integer acre-feet; the literal `m` marks a missing day and
//! is dropped rather than zero-filled.

use super::stats::{ParseResult, ParseStats};
use crate::app::models::DailyPoint;
use crate::constants::{
    NO_USABLE_DATA, WATER_LEVEL_COMMENT_CHAR, WATER_LEVEL_FIRST_DAY_COLUMN,
    WATER_LEVEL_MISSING_MARKER, WATER_LEVEL_MONTH_COLUMN, WATER_LEVEL_YEAR_COLUMN,
};
use crate::{Error, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use tracing::debug;

/// Parse a CDEC export into daily storage points
///
/// `context` names the payload (usually the station id) in errors and logs.
/// Fails with a parse error when no point could be produced.
pub fn parse_water_levels(raw: &str, context: &str) -> Result<ParseResult<NaiveDate>> {
    let mut stats = ParseStats::new();
    let mut points = Vec::new();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(WATER_LEVEL_COMMENT_CHAR))
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    for result in reader.records() {
        stats.total_records += 1;

        match result {
            Ok(record) => {
                if let Err(e) = parse_month_record(&record, &mut points, &mut stats) {
                    stats.skip(format!("{} record {}: {}", context, stats.total_records, e));
                }
            }
            Err(e) => {
                stats.skip(format!(
                    "{} CSV error at record {}: {}",
                    context, stats.total_records, e
                ));
            }
        }
    }

    stats.points_parsed = points.len();
    debug!(
        "Parsed {} storage points for {} ({} missing, {} skipped)",
        stats.points_parsed, context, stats.missing_values, stats.records_skipped
    );

    if points.is_empty() {
        return Err(Error::parse(context, NO_USABLE_DATA));
    }

    Ok(ParseResult { points, stats })
}

/// Expand one station-month line into its daily points
fn parse_month_record(
    record: &StringRecord,
    points: &mut Vec<DailyPoint>,
    stats: &mut ParseStats,
) -> Result<()> {
    if record.len() <= WATER_LEVEL_FIRST_DAY_COLUMN {
        return Err(Error::parse(
            "water level record",
            format!(
                "expected at least {} columns, found {}",
                WATER_LEVEL_FIRST_DAY_COLUMN + 1,
                record.len()
            ),
        ));
    }

    let year: i32 = parse_column(record, WATER_LEVEL_YEAR_COLUMN, "year")?;
    let month: u32 = parse_column(record, WATER_LEVEL_MONTH_COLUMN, "month")?;

    for (offset, raw_value) in record.iter().skip(WATER_LEVEL_FIRST_DAY_COLUMN).enumerate() {
        let day = offset as u32 + 1;

        // Trailing commas leave empty cells; treat them like the missing marker
        if raw_value == WATER_LEVEL_MISSING_MARKER || raw_value.is_empty() {
            stats.missing_values += 1;
            continue;
        }

        let value: i64 = match raw_value.parse() {
            Ok(value) => value,
            Err(_) => {
                stats.skip(format!(
                    "invalid storage value '{}' for {}-{:02}-{:02}",
                    raw_value, year, month, day
                ));
                continue;
            }
        };

        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            stats.skip(format!("invalid date {}-{:02}-{:02}", year, month, day));
            continue;
        };

        points.push(DailyPoint::new(date, value as f64));
    }

    Ok(())
}

fn parse_column<T: std::str::FromStr>(
    record: &StringRecord,
    index: usize,
    field_name: &str,
) -> Result<T> {
    let value = record.get(index).unwrap_or("");
    value.parse().map_err(|_| {
        Error::parse(
            "water level record",
            format!("invalid {} '{}'", field_name, value),
        )
    })
}
