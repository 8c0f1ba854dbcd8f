//! Data models for catastrophe estimation
//!
//! This module contains the value types that flow through the pipeline: single
//! series observations, reservoir stations, fitted lines and the catastrophe
//! records written to the result store.

use crate::constants::META_STATION_ID;
use crate::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Series Axis Encoding
// =============================================================================

/// Encodes a series date as the scalar x-axis used for fitting
///
/// Calendar dates use the proleptic Gregorian ordinal (0001-01-01 is day 1),
/// fractional years are used as-is.
pub trait AxisValue {
    fn to_axis(&self) -> f64;
}

impl AxisValue for NaiveDate {
    fn to_axis(&self) -> f64 {
        f64::from(self.num_days_from_ce())
    }
}

/// Decimal year such as `1993.0115`, as published in the sea level record
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FractionalYear(pub f64);

impl FractionalYear {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl AxisValue for FractionalYear {
    fn to_axis(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for FractionalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

// =============================================================================
// Series Point
// =============================================================================

/// One (date, value) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint<D> {
    pub date: D,
    pub value: f64,
}

impl<D> SeriesPoint<D> {
    pub fn new(date: D, value: f64) -> Self {
        Self { date, value }
    }
}

impl<D: AxisValue> SeriesPoint<D> {
    /// The point's date on the fitting axis
    pub fn x(&self) -> f64 {
        self.date.to_axis()
    }
}

/// Daily reservoir storage observation (acre-feet)
pub type DailyPoint = SeriesPoint<NaiveDate>;

/// Sea level deviation observation (millimetres)
pub type YearlyPoint = SeriesPoint<FractionalYear>;

// =============================================================================
// Station
// =============================================================================

/// A reservoir gauge and, once fetched, its daily storage series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// CDEC station code (e.g., "SHA", "ORO")
    pub station_id: String,

    /// Display name from the discovery listing (e.g., "Shasta")
    pub name: String,

    /// Storage observations ordered by date
    pub series: Vec<DailyPoint>,
}

impl Station {
    /// Create a station with an empty series
    pub fn new(station_id: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let station = Self {
            station_id: station_id.into().trim().to_string(),
            name: name.into().trim().to_string(),
            series: Vec::new(),
        };

        station.validate()?;
        Ok(station)
    }

    /// The synthetic station holding the date-wise sum of all stations
    pub fn meta(series: Vec<DailyPoint>) -> Self {
        Self {
            station_id: META_STATION_ID.to_string(),
            name: META_STATION_ID.to_string(),
            series,
        }
    }

    /// Replace the series, consuming the empty station
    pub fn with_series(mut self, series: Vec<DailyPoint>) -> Self {
        self.series = series;
        self
    }

    pub fn is_meta(&self) -> bool {
        self.station_id == META_STATION_ID
    }

    pub fn validate(&self) -> Result<()> {
        if self.station_id.is_empty() {
            return Err(Error::parse(
                "station listing",
                "Station identifier cannot be empty",
            ));
        }

        if self.name.is_empty() {
            return Err(Error::parse(
                "station listing",
                format!("Station {} has no name", self.station_id),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.station_id)
    }
}

// =============================================================================
// Fitted Line
// =============================================================================

/// Result of an unweighted least-squares fit: `value = rate * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedLine {
    /// Change in value per unit of x (per day or per year)
    pub rate: f64,
    pub intercept: f64,
}

impl FittedLine {
    pub fn new(rate: f64, intercept: f64) -> Self {
        Self { rate, intercept }
    }

    pub fn value_at(&self, x: f64) -> f64 {
        self.rate * x + self.intercept
    }
}

// =============================================================================
// Catastrophe Record
// =============================================================================

/// A named catastrophe and the date it is expected to arrive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatastropheRecord {
    /// Unique key, e.g. "Miami sinks"
    pub name: String,

    pub arrival_date: DateTime<Utc>,

    #[serde(default)]
    pub description: String,
}

impl CatastropheRecord {
    pub fn new(
        name: impl Into<String>,
        arrival_date: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arrival_date,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_axis_matches_day_one() {
        let first_day = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
        assert_eq!(first_day.to_axis(), 1.0);

        let d1 = NaiveDate::from_ymd_opt(2015, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2015, 6, 3).unwrap();
        assert_eq!(d2.to_axis() - d1.to_axis(), 2.0);
    }

    #[test]
    fn test_fractional_year_axis() {
        let point = YearlyPoint::new(FractionalYear(1993.5), 12.0);
        assert_eq!(point.x(), 1993.5);
    }

    #[test]
    fn test_station_new_trims_and_validates() {
        let station = Station::new(" SHA ", " Shasta ").unwrap();
        assert_eq!(station.station_id, "SHA");
        assert_eq!(station.name, "Shasta");
        assert!(station.series.is_empty());
        assert!(!station.is_meta());

        assert!(Station::new("", "Nameless").is_err());
        assert!(Station::new("XYZ", "  ").is_err());
    }

    #[test]
    fn test_meta_station() {
        let meta = Station::meta(vec![]);
        assert!(meta.is_meta());
        assert_eq!(meta.name, "META");
    }

    #[test]
    fn test_fitted_line_value_at() {
        let line = FittedLine::new(-2.0, 100.0);
        assert_eq!(line.value_at(0.0), 100.0);
        assert_eq!(line.value_at(50.0), 0.0);
    }
}
