//! Coastal submersion job
//!
//! Fits the global sea level record (millimetres against fractional years)
//! and finds when it reaches the configured coastal elevation. The primary
//! date decodes the crossing year with the 30.5-day month approximation; a
//! second estimate adds the remaining years to the run date and is reported
//! alongside as a cross-check only.

use super::Pipeline;
use crate::app::models::{FittedLine, FractionalYear};
use crate::app::services::extrapolator::{
    crossing_x, fractional_year_to_datetime, years_from_now_cross_check,
};
use crate::app::services::result_sink::UpsertOutcome;
use crate::app::services::source_fetcher::TextSource;
use crate::app::services::trend_fitter::{SignPolicy, fit_line};
use crate::constants::SUBMERSION_JOB;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct SubmersionOutcome {
    pub catastrophe_name: String,
    pub points: usize,
    pub line: FittedLine,
    pub elevation_mm: f64,
    pub crossing_year: FractionalYear,
    pub arrival_date: DateTime<Utc>,
    pub cross_check_date: DateTime<Utc>,
    pub upsert: UpsertOutcome,
}

impl<S: TextSource + 'static> Pipeline<S> {
    /// Run the coastal submersion job as of `now`
    pub async fn run_submersion(&self, now: DateTime<Utc>) -> Result<SubmersionOutcome> {
        let coastal = &self.config.coastal;
        info!(
            "Running {} to {} mm",
            SUBMERSION_JOB, coastal.elevation_mm
        );

        let parsed = tokio::select! {
            result = self.fetcher.fetch_sea_level() => result,
            _ = self.cancellation_token.cancelled() => {
                return Err(Error::processing_interrupted("sea level fetch cancelled by user"));
            }
        };

        let parsed = parsed.map_err(|e| match e {
            Error::Parse { .. } => Error::no_usable_data(SUBMERSION_JOB, e.to_string()),
            other => other,
        })?;

        info!(
            "Parsed {} sea level points ({} missing, {} skipped)",
            parsed.stats.points_parsed, parsed.stats.missing_values, parsed.stats.records_skipped
        );

        let line = fit_line(&parsed.points, SignPolicy::Unconstrained)?;
        if line.rate <= 0.0 {
            warn!("Sea level is not rising (rate {:.3} mm/yr)", line.rate);
        }

        let crossing_year = FractionalYear(crossing_x(&line, coastal.elevation_mm)?);
        let arrival_date = fractional_year_to_datetime(crossing_year)?;
        let cross_check_date = years_from_now_cross_check(&line, coastal.elevation_mm, now)?;

        info!(
            "{}: rate {:.3} mm/yr, crossing at decimal year {}",
            coastal.catastrophe_name, line.rate, crossing_year
        );
        info!(
            "Arrival {} (cross-check from now: {})",
            arrival_date.date_naive(),
            cross_check_date.date_naive()
        );

        let upsert = self
            .sink
            .upsert(&coastal.catastrophe_name, arrival_date, &coastal.description)?;

        Ok(SubmersionOutcome {
            catastrophe_name: coastal.catastrophe_name.clone(),
            points: parsed.points.len(),
            line,
            elevation_mm: coastal.elevation_mm,
            crossing_year,
            arrival_date,
            cross_check_date,
            upsert,
        })
    }
}
