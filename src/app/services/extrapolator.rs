//! Threshold extrapolation
//!
//! Finds where a fitted line reaches a target value and turns that x back
//! into a calendar date, using the inverse of whichever axis encoding the
//! series was fitted on.
//!
//! Fractional years are decoded with a fixed calendar approximation of twelve
//! 30.5-day months. This is intentionally imprecise (up to a few days off a
//! true calendar conversion) and matches how published estimates have always
//! been derived. The month and day are 1-based and the day is clamped to the
//! month's length, so every fraction maps to a real date.

use crate::app::models::{FittedLine, FractionalYear};
use crate::constants::{APPROX_DAYS_PER_MONTH, DAYS_PER_YEAR, MONTHS_PER_YEAR};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// x at which `line` equals `target`: `(target - intercept) / rate`
pub fn crossing_x(line: &FittedLine, target: f64) -> Result<f64> {
    if line.rate == 0.0 || !line.rate.is_finite() {
        return Err(Error::crossing_undefined(format!(
            "line with rate {} never reaches {}",
            line.rate, target
        )));
    }

    let x = (target - line.intercept) / line.rate;
    if !x.is_finite() {
        return Err(Error::crossing_undefined(format!(
            "crossing of {} is not finite (rate {}, intercept {})",
            target, line.rate, line.intercept
        )));
    }

    Ok(x)
}

/// Inverse of the ordinal-day axis; fractional days are truncated toward the
/// earlier date
pub fn ordinal_to_date(x: f64) -> Result<NaiveDate> {
    let day = x.floor();
    if day < f64::from(i32::MIN) || day > f64::from(i32::MAX) {
        return Err(out_of_range(x));
    }

    NaiveDate::from_num_days_from_ce_opt(day as i32).ok_or_else(|| out_of_range(x))
}

/// Date at which a daily-axis line reaches `target`
pub fn extrapolate_date(line: &FittedLine, target: f64) -> Result<NaiveDate> {
    ordinal_to_date(crossing_x(line, target)?)
}

/// Decode a fractional year with the 12 x 30.5-day approximation, at midnight UTC
pub fn fractional_year_to_datetime(year: FractionalYear) -> Result<DateTime<Utc>> {
    let value = year.value();
    let whole = value.floor();
    if !value.is_finite() || whole < f64::from(i32::MIN) || whole > f64::from(i32::MAX) {
        return Err(out_of_range(value));
    }

    let remainder = value - whole;
    let months = remainder * MONTHS_PER_YEAR;
    let month = (months.floor() as u32 + 1).min(12);
    let day_fraction = months - months.floor();
    let day = day_fraction * APPROX_DAYS_PER_MONTH;

    let year = whole as i32;
    let month_length = days_in_month(year, month).ok_or_else(|| out_of_range(value))?;
    let day = (day.floor() as u32 + 1).min(month_length);

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| out_of_range(value))?;
    Ok(midnight_utc(date))
}

/// Start of `date` in UTC
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Position of `instant` within its year as a decimal year
pub fn to_fractional_year(instant: DateTime<Utc>) -> FractionalYear {
    let year = instant.year();
    let days_in_year = if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    };
    let seconds_into_day = f64::from(instant.num_seconds_from_midnight());
    let day_position = f64::from(instant.ordinal0()) + seconds_into_day / SECONDS_PER_DAY;

    FractionalYear(f64::from(year) + day_position / days_in_year)
}

/// Alternative estimate: years remaining from `now` until the line reaches
/// `target`, converted with 365.25-day years and added to `now`
pub fn years_from_now_cross_check(
    line: &FittedLine,
    target: f64,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let years_remaining = crossing_x(line, target)? - to_fractional_year(now).value();
    let seconds = years_remaining * DAYS_PER_YEAR * SECONDS_PER_DAY;

    if !seconds.is_finite() || seconds.abs() > i64::MAX as f64 / 1_000.0 {
        return Err(out_of_range(years_remaining));
    }

    Duration::try_seconds(seconds.round() as i64)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or_else(|| out_of_range(years_remaining))
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

fn out_of_range(x: f64) -> Error {
    Error::crossing_undefined(format!("crossing at {} is not a representable date", x))
}
