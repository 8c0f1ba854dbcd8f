//! Bounded concurrent fetching of reservoir stations
//!
//! Workers pull stations from a shared queue until it is empty, so at most
//! `workers` fetches are in flight. Each worker fetches and parses one station
//! at a time and shares nothing else; results are joined and put back in
//! listing order before anything downstream sees them.

use crate::app::models::Station;
use crate::app::services::source_fetcher::{SourceFetcher, TextSource};
use crate::{Error, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

type WorkQueue = Arc<Mutex<VecDeque<(usize, Station)>>>;
type WorkerOutput = Vec<(usize, std::result::Result<Station, StationFailure>)>;

/// A station that produced no series this run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationFailure {
    pub station_id: String,
    pub name: String,
    pub reason: String,
}

/// Stations with populated series, plus the ones that failed
#[derive(Debug, Default)]
pub struct PoolReport {
    pub stations: Vec<Station>,
    pub failures: Vec<StationFailure>,
}

pub struct StationPool<S> {
    fetcher: Arc<SourceFetcher<S>>,
    max_workers: usize,
    show_progress: bool,
    cancellation_token: CancellationToken,
}

impl<S: TextSource + 'static> StationPool<S> {
    pub fn new(
        fetcher: Arc<SourceFetcher<S>>,
        max_workers: usize,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            max_workers: max_workers.max(1),
            show_progress: false,
            cancellation_token,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Half the stations, at least one, capped by `max_workers`
    pub fn worker_count(&self, station_count: usize) -> usize {
        (station_count / 2).min(self.max_workers).max(1)
    }

    /// Fetch every station over `[start, end]`
    ///
    /// Fails only if the run is cancelled or a worker task dies; individual
    /// station failures end up in [`PoolReport::failures`].
    pub async fn fetch_all(
        &self,
        stations: Vec<Station>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PoolReport> {
        let total = stations.len();
        let workers = self.worker_count(total);
        let progress = self.create_progress_bar(total as u64);

        info!("Fetching {} stations with {} workers", total, workers);

        let queue: WorkQueue = Arc::new(Mutex::new(stations.into_iter().enumerate().collect()));
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut join_set = JoinSet::new();

        for worker_id in 0..workers {
            let fetcher = self.fetcher.clone();
            let queue = queue.clone();
            let semaphore = semaphore.clone();
            let progress = progress.clone();
            let cancellation_token = self.cancellation_token.clone();

            join_set.spawn(async move {
                Self::worker_task(
                    worker_id,
                    fetcher,
                    queue,
                    semaphore,
                    progress,
                    cancellation_token,
                    (start, end),
                )
                .await
            });
        }

        let mut outputs = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Ok(output)) => outputs.extend(output),
                Ok(Err(e)) => {
                    join_set.abort_all();
                    progress.abandon();
                    return Err(e);
                }
                Err(join_error) => {
                    join_set.abort_all();
                    progress.abandon();
                    return Err(Error::processing_interrupted(format!(
                        "station worker failed: {}",
                        join_error
                    )));
                }
            }
        }

        if self.cancellation_token.is_cancelled() {
            progress.abandon_with_message("cancelled");
            return Err(Error::processing_interrupted(
                "station fetch cancelled by user",
            ));
        }

        progress.finish_with_message("stations fetched");

        outputs.sort_by_key(|(index, _)| *index);
        let mut report = PoolReport::default();
        for (_, outcome) in outputs {
            match outcome {
                Ok(station) => report.stations.push(station),
                Err(failure) => report.failures.push(failure),
            }
        }

        info!(
            "Fetched {} of {} stations ({} failed)",
            report.stations.len(),
            total,
            report.failures.len()
        );

        Ok(report)
    }

    async fn worker_task(
        worker_id: usize,
        fetcher: Arc<SourceFetcher<S>>,
        queue: WorkQueue,
        semaphore: Arc<Semaphore>,
        progress: ProgressBar,
        cancellation_token: CancellationToken,
        (start, end): (NaiveDate, NaiveDate),
    ) -> Result<WorkerOutput> {
        let mut output = Vec::new();
        debug!("Worker {} started", worker_id);

        loop {
            if cancellation_token.is_cancelled() {
                debug!("Worker {} cancelled", worker_id);
                break;
            }

            let Some((index, station)) = queue.lock().await.pop_front() else {
                debug!("Worker {} finished - no more stations", worker_id);
                break;
            };

            let _permit = semaphore.acquire().await.map_err(|e| {
                Error::processing_interrupted(format!(
                    "worker {} could not acquire a fetch slot: {}",
                    worker_id, e
                ))
            })?;

            let station_id = station.station_id.clone();
            let name = station.name.clone();

            let fetched = tokio::select! {
                result = fetcher.fetch_station(station, start, end) => result,
                _ = cancellation_token.cancelled() => {
                    debug!("Worker {} interrupted while fetching {}", worker_id, station_id);
                    break;
                }
            };

            match fetched {
                Ok(station) => output.push((index, Ok(station))),
                Err(e) => {
                    error!("Failed to fetch station {} ({}): {}", station_id, name, e);
                    output.push((
                        index,
                        Err(StationFailure {
                            station_id,
                            name,
                            reason: e.to_string(),
                        }),
                    ));
                }
            }

            progress.inc(1);
        }

        Ok(output)
    }

    fn create_progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} stations {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
