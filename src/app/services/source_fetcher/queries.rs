//! Query construction for the CDEC daily export

use crate::constants::{DAILY_DURATION_CODE, STORAGE_SENSOR_NUM};
use chrono::{Datelike, NaiveDate};

/// Build the daily storage export URL for one station
///
/// Dates are written `Y/M/D` without zero padding, which is what the export
/// endpoint expects.
pub fn station_series_url(base_url: &str, station_id: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}?station_id={}&dur_code={}&sensor_num={}&start_date={}&end_date={}",
        base_url,
        station_id,
        DAILY_DURATION_CODE,
        STORAGE_SENSOR_NUM,
        format_query_date(start),
        format_query_date(end)
    )
}

fn format_query_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}
