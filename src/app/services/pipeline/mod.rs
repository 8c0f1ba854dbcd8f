//! Catastrophe pipelines
//!
//! Each job composes the services leaf-first:
//!
//! ```text
//! SourceFetcher -> text parser -> [aggregator] -> trend fitter -> extrapolator -> ResultSink
//! ```
//!
//! - [`depletion`] - reservoir storage reaching zero
//! - [`submersion`] - global sea level reaching a coastal elevation
//! - [`station_pool`] - bounded concurrent fetch of every reservoir station
//!
//! Per-station failures are logged and dropped; a job that ends up with no
//! usable series fails with [`Error::NoUsableData`](crate::Error::NoUsableData).
//! The current instant is passed in by the caller so runs are reproducible.

pub mod depletion;
pub mod station_pool;
pub mod submersion;

#[cfg(test)]
pub mod tests;

pub use depletion::{DepletionOutcome, StationCrossing};
pub use station_pool::{PoolReport, StationFailure, StationPool};
pub use submersion::SubmersionOutcome;

use crate::app::services::result_sink::ResultSink;
use crate::app::services::source_fetcher::{SourceFetcher, TextSource};
use crate::config::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs catastrophe jobs against one text source and one result sink
pub struct Pipeline<S> {
    fetcher: Arc<SourceFetcher<S>>,
    config: Config,
    sink: Arc<dyn ResultSink>,
    show_progress: bool,
    cancellation_token: CancellationToken,
}

impl<S: TextSource + 'static> Pipeline<S> {
    pub fn new(source: Arc<S>, config: Config, sink: Arc<dyn ResultSink>) -> Self {
        let fetcher = SourceFetcher::new(
            source,
            config.sources.clone(),
            &config.reservoir.excluded_stations,
        );

        Self {
            fetcher: Arc::new(fetcher),
            config,
            sink,
            show_progress: false,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Show a progress bar while stations are fetched
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Stop taking new work once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sink(&self) -> &dyn ResultSink {
        self.sink.as_ref()
    }
}
