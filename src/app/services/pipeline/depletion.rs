//! Reservoir depletion job
//!
//! Discovers the reporting reservoirs, fetches their daily storage since the
//! configured start date and estimates when storage reaches zero.
//!
//! Two strategies are supported and give different answers:
//!
//! - `aggregate` (default): sum every station by date, fit the summed series
//!   once and extrapolate its zero crossing.
//! - `latest-per-station`: fit and extrapolate each station on its own, then
//!   report the latest crossing that is still in the future. Stations that
//!   are not draining, or whose crossing has already passed, are logged and
//!   left out of the selection.

use super::{Pipeline, StationFailure, StationPool};
use crate::app::models::Station;
use crate::app::services::aggregator::aggregate_stations;
use crate::app::services::extrapolator::{extrapolate_date, midnight_utc};
use crate::app::services::result_sink::UpsertOutcome;
use crate::app::services::source_fetcher::TextSource;
use crate::app::services::trend_fitter::{SignPolicy, fit_line};
use crate::config::DepletionStrategy;
use crate::constants::DEPLETION_JOB;
use crate::{Error, FittedLine, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Zero-crossing estimate for one station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationCrossing {
    pub station_id: String,
    pub name: String,
    pub line: FittedLine,
    pub crossing_date: NaiveDate,
    /// Crossing on or before the run date
    pub already_crossed: bool,
}

/// Everything a depletion run computed
#[derive(Debug, Clone, Serialize)]
pub struct DepletionOutcome {
    pub catastrophe_name: String,
    pub strategy: DepletionStrategy,
    pub stations_discovered: usize,
    pub stations_fetched: usize,
    pub failures: Vec<StationFailure>,
    /// Fitted line of the summed series (aggregate strategy only)
    pub aggregate_line: Option<FittedLine>,
    /// Per-station estimates (latest-per-station strategy only)
    pub crossings: Vec<StationCrossing>,
    pub arrival_date: DateTime<Utc>,
    pub upsert: UpsertOutcome,
}

impl<S: TextSource + 'static> Pipeline<S> {
    /// Run the reservoir depletion job as of `now`
    pub async fn run_depletion(&self, now: DateTime<Utc>) -> Result<DepletionOutcome> {
        let reservoir = &self.config.reservoir;
        let start = reservoir.start_date;
        let end = now.date_naive();

        if start > end {
            return Err(Error::configuration(format!(
                "reservoir start date {} is after the run date {}",
                start, end
            )));
        }

        info!(
            "Running {} ({} strategy) from {} to {}",
            DEPLETION_JOB, reservoir.strategy, start, end
        );

        let discovered = self.fetcher.discover_stations().await?;
        if discovered.is_empty() {
            return Err(Error::no_usable_data(
                DEPLETION_JOB,
                "reservoir listing named no stations",
            ));
        }
        let stations_discovered = discovered.len();

        let report = StationPool::new(
            self.fetcher.clone(),
            self.config.fetch.max_workers,
            self.cancellation_token.clone(),
        )
        .with_progress(self.show_progress)
        .fetch_all(discovered, start, end)
        .await?;

        if report.stations.is_empty() {
            return Err(Error::no_usable_data(
                DEPLETION_JOB,
                format!("all {} stations failed to fetch or parse", stations_discovered),
            ));
        }

        let (arrival, aggregate_line, crossings) = match reservoir.strategy {
            DepletionStrategy::Aggregate => {
                let (date, line) = aggregate_crossing(&report.stations)?;
                (date, Some(line), Vec::new())
            }
            DepletionStrategy::LatestPerStation => {
                let crossings = station_crossings(&report.stations, end);
                let date = latest_future_crossing(&crossings).ok_or_else(|| {
                    Error::no_usable_data(
                        DEPLETION_JOB,
                        "no station is draining toward a future crossing",
                    )
                })?;
                (date, None, crossings)
            }
        };

        let arrival_date = midnight_utc(arrival);
        info!("{}: storage reaches zero on {}", reservoir.catastrophe_name, arrival);

        let upsert = self.sink.upsert(
            &reservoir.catastrophe_name,
            arrival_date,
            &reservoir.description,
        )?;

        Ok(DepletionOutcome {
            catastrophe_name: reservoir.catastrophe_name.clone(),
            strategy: reservoir.strategy,
            stations_discovered,
            stations_fetched: report.stations.len(),
            failures: report.failures,
            aggregate_line,
            crossings,
            arrival_date,
            upsert,
        })
    }
}

/// Sum, fit and extrapolate; a non-draining total fails the job
fn aggregate_crossing(stations: &[Station]) -> Result<(NaiveDate, FittedLine)> {
    let meta = aggregate_stations(stations);
    if meta.series.is_empty() {
        return Err(Error::no_usable_data(
            DEPLETION_JOB,
            "aggregate series is empty",
        ));
    }

    let line = fit_line(&meta.series, SignPolicy::MustDecrease)?;
    info!(
        "Aggregate of {} stations over {} days: {:.1} AF/day",
        stations.len(),
        meta.series.len(),
        line.rate
    );

    Ok((extrapolate_date(&line, 0.0)?, line))
}

/// Fit each station independently; stations that cannot be fitted are logged
fn station_crossings(stations: &[Station], today: NaiveDate) -> Vec<StationCrossing> {
    let mut crossings = Vec::new();

    for station in stations {
        let estimate = fit_line(&station.series, SignPolicy::MustDecrease)
            .and_then(|line| Ok((line, extrapolate_date(&line, 0.0)?)));

        match estimate {
            Ok((line, crossing_date)) => {
                let already_crossed = crossing_date <= today;
                if already_crossed {
                    warn!(
                        "{} already crossed zero on {}; not considered",
                        station, crossing_date
                    );
                } else {
                    info!("{} reaches zero on {}", station, crossing_date);
                }

                crossings.push(StationCrossing {
                    station_id: station.station_id.clone(),
                    name: station.name.clone(),
                    line,
                    crossing_date,
                    already_crossed,
                });
            }
            Err(e) => warn!("Skipping {}: {}", station, e),
        }
    }

    crossings
}

fn latest_future_crossing(crossings: &[StationCrossing]) -> Option<NaiveDate> {
    crossings
        .iter()
        .filter(|c| !c.already_crossed)
        .map(|c| c.crossing_date)
        .max()
}
