//! Test utilities for pipeline testing
//!
//! Builds listing pages, station exports and pipelines wired to an in-memory
//! text source and result sink.

use crate::app::services::pipeline::Pipeline;
use crate::app::services::result_sink::MemorySink;
use crate::app::services::source_fetcher::tests::MockTextSource;
use crate::config::{Config, DepletionStrategy};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;


/// Fixed run instant so crossing classification is reproducible
pub fn run_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 1, 1, 12, 0, 0).unwrap()
}

/// Listing page naming the given `(id, name)` stations
pub fn listing_html(stations: &[(&str, &str)]) -> String {
    let rows: String = stations
        .iter()
        .map(|(id, name)| format!("<tr><td><a href=\"#\">{}</a></td><td><b>{}</b></td></tr>\n", name, id))
        .collect();
    format!(
        "<table>\n<tr><th>Name</th><th>ID</th></tr>\n{}</table>",
        rows
    )
}

/// One month of daily values for a station, starting on the 1st
pub fn station_csv(id: &str, year: i32, month: u32, values: &[&str]) -> String {
    format!(
        "'{} storage\n{},15,{},{},{}",
        id,
        id,
        year,
        month,
        values.join(",")
    )
}

/// Mock source serving a listing and June 2015 exports for each station
pub fn depletion_source(
    config: &Config,
    stations: &[(&str, &[&str])],
) -> MockTextSource {
    let listing: Vec<(&str, &str)> = stations.iter().map(|(id, _)| (*id, *id)).collect();
    let base = &config.sources.station_csv_url;

    stations.iter().fold(
        MockTextSource::new()
            .with_document(config.sources.reservoir_listing_url.clone(), listing_html(&listing)),
        |mock, (id, values)| mock.with_station(base, id, station_csv(id, 2015, 6, values)),
    )
}

pub fn config_with_strategy(strategy: DepletionStrategy) -> Config {
    let mut config = Config::default();
    config.reservoir.strategy = strategy;
    config.fetch.max_workers = 2;
    config
}

pub fn pipeline(
    mock: MockTextSource,
    config: Config,
) -> (Pipeline<MockTextSource>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Pipeline::new(Arc::new(mock), config, sink.clone()), sink)
}
