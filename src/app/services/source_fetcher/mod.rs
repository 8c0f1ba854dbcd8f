//! Source fetching for the upstream data feeds
//!
//! Retrieval is split from parsing: a [`TextSource`] turns a URL into raw
//! text, and [`SourceFetcher`] knows which URLs to ask for and hands the text
//! to the matching parser. Every fetch is a plain GET, so repeating one with
//! the same inputs against the same remote state gives the same result.
//!
//! - [`http`] - reqwest-backed [`TextSource`]
//! - [`discovery`] - reservoir listing page to station list
//! - [`queries`] - URL construction for the per-station export

pub mod discovery;
pub mod http;
pub mod queries;

#[cfg(test)]
pub mod tests;

pub use discovery::{ListingStats, StationListing, parse_station_listing};
pub use http::HttpTextSource;

use crate::Result;
use crate::app::models::{FractionalYear, Station};
use crate::app::services::text_parser::{ParseResult, parse_sea_levels, parse_water_levels};
use crate::config::SourcesConfig;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Anything that can turn a URL into a text document
///
/// Implemented over HTTP by [`HttpTextSource`]; tests provide in-memory
/// implementations so no network is needed.
pub trait TextSource: Send + Sync {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Fetches and parses the three logical sources
#[derive(Debug)]
pub struct SourceFetcher<S> {
    source: Arc<S>,
    sources: SourcesConfig,
    excluded: HashSet<String>,
}

impl<S: TextSource> SourceFetcher<S> {
    /// Create a fetcher; `excluded_stations` are matched case-insensitively
    pub fn new(source: Arc<S>, sources: SourcesConfig, excluded_stations: &[String]) -> Self {
        let excluded = excluded_stations
            .iter()
            .map(|id| id.trim().to_uppercase())
            .collect();

        Self {
            source,
            sources,
            excluded,
        }
    }

    /// Retrieve the reservoir listing and extract the stations it names
    pub async fn discover_stations(&self) -> Result<Vec<Station>> {
        let url = &self.sources.reservoir_listing_url;
        info!("Discovering reservoir stations from {}", url);

        let html = self.source.fetch_text(url).await?;
        let listing = parse_station_listing(&html, &self.excluded);

        info!(
            "Discovered {} stations ({} header rows, {} malformed, {} excluded)",
            listing.stations.len(),
            listing.stats.header_rows,
            listing.stats.malformed_rows,
            listing.stats.excluded
        );

        Ok(listing.stations)
    }

    /// Raw CDEC export for one station over `[start, end]`
    pub async fn fetch_station_text(
        &self,
        station_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String> {
        let url = queries::station_series_url(&self.sources.station_csv_url, station_id, start, end);
        debug!("Fetching storage series for {}: {}", station_id, url);
        self.source.fetch_text(&url).await
    }

    /// Fetch and parse one station, returning it with its series populated
    pub async fn fetch_station(
        &self,
        station: Station,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Station> {
        let raw = self
            .fetch_station_text(&station.station_id, start, end)
            .await?;
        let parsed = parse_water_levels(&raw, &station.station_id)?;

        debug!(
            "{}: {} points ({} missing days)",
            station, parsed.stats.points_parsed, parsed.stats.missing_values
        );

        Ok(station.with_series(parsed.points))
    }

    /// Raw global sea level record
    pub async fn fetch_sea_level_text(&self) -> Result<String> {
        let url = &self.sources.sea_level_url;
        info!("Fetching global sea level record from {}", url);
        self.source.fetch_text(url).await
    }

    /// Fetch and parse the global sea level record
    pub async fn fetch_sea_level(&self) -> Result<ParseResult<FractionalYear>> {
        let raw = self.fetch_sea_level_text().await?;
        parse_sea_levels(&raw, "global sea level record")
    }

    pub fn is_excluded(&self, station_id: &str) -> bool {
        self.excluded.contains(&station_id.trim().to_uppercase())
    }
}
