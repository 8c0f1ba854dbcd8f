//! Tests for the source fetcher against an in-memory text source

use super::*;
use crate::app::models::FractionalYear;
use crate::app::services::source_fetcher::SourceFetcher;
use crate::app::services::text_parser::tests::create_test_sea_level_payload;
use crate::config::SourcesConfig;
use crate::{Error, Station};
use chrono::NaiveDate;
use std::sync::Arc;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2012, 1, 1).unwrap()
}

fn end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 10, 9).unwrap()
}

#[tokio::test]
async fn test_discover_stations_applies_exclusions() {
    let sources = SourcesConfig::default();
    let mock = MockTextSource::new()
        .with_document(sources.reservoir_listing_url.clone(), create_test_listing_html());
    let fetcher = SourceFetcher::new(Arc::new(mock), sources, &["fol".to_string()]);

    let stations = fetcher.discover_stations().await.unwrap();

    let ids: Vec<_> = stations.iter().map(|s| s.station_id.clone()).collect();
    assert_eq!(ids, vec!["SHA", "ORO"]);
    assert!(fetcher.is_excluded("FOL"));
    assert!(!fetcher.is_excluded("SHA"));
}

#[tokio::test]
async fn test_fetch_station_populates_series() {
    let sources = SourcesConfig::default();
    let mock = Arc::new(MockTextSource::new().with_station(
        &sources.station_csv_url,
        "SHA",
        "'header\nSHA,15,2015,6,100,m,102",
    ));
    let fetcher = SourceFetcher::new(mock.clone(), sources, &[]);

    let station = fetcher
        .fetch_station(Station::new("SHA", "Shasta").unwrap(), start(), end())
        .await
        .unwrap();

    assert_eq!(station.name, "Shasta");
    assert_eq!(station.series.len(), 2);
    assert_eq!(
        mock.requests(),
        vec![
            "http://cdec.water.ca.gov/cgi-progs/getDailyCSV?station_id=SHA&dur_code=D&sensor_num=15&start_date=2012/1/1&end_date=2016/10/9"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_fetch_station_propagates_fetch_error() {
    let sources = SourcesConfig::default();
    let mock = MockTextSource::new().with_station_failure(&sources.station_csv_url, "ORO");
    let fetcher = SourceFetcher::new(Arc::new(mock), sources, &[]);

    let result = fetcher
        .fetch_station(Station::new("ORO", "Oroville").unwrap(), start(), end())
        .await;

    assert!(matches!(result, Err(Error::Fetch { .. })));
}

#[tokio::test]
async fn test_fetch_station_propagates_parse_error() {
    let sources = SourcesConfig::default();
    let mock = MockTextSource::new().with_station(&sources.station_csv_url, "ORO", "'nothing here");
    let fetcher = SourceFetcher::new(Arc::new(mock), sources, &[]);

    let result = fetcher
        .fetch_station(Station::new("ORO", "Oroville").unwrap(), start(), end())
        .await;

    match result.unwrap_err() {
        Error::Parse { context, message } => {
            assert_eq!(context, "ORO");
            assert_eq!(message, "no usable data");
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_sea_level() {
    let sources = SourcesConfig::default();
    let mock = MockTextSource::new()
        .with_document(sources.sea_level_url.clone(), create_test_sea_level_payload());
    let fetcher = SourceFetcher::new(Arc::new(mock), sources, &[]);

    let result = fetcher.fetch_sea_level().await.unwrap();

    assert_eq!(result.points.len(), 3);
    assert_eq!(result.points[1].date, FractionalYear(1994.0));
}

#[tokio::test]
async fn test_unknown_url_is_fetch_error() {
    let fetcher = SourceFetcher::new(Arc::new(MockTextSource::new()), SourcesConfig::default(), &[]);

    assert!(matches!(
        fetcher.discover_stations().await,
        Err(Error::Fetch { .. })
    ));
}
