//! Date-wise aggregation of station series
//!
//! Combines every station's daily storage into one synthetic `META` station
//! whose value on each date is the sum of the values reported on that date.
//! Stations missing a date simply contribute nothing to it.

use crate::app::models::{DailyPoint, Station};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Sum all stations by date into the `META` station, ordered by date
///
/// The result does not depend on the order of `stations` or of the points
/// within each series.
pub fn aggregate_stations(stations: &[Station]) -> Station {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for station in stations {
        for point in &station.series {
            *totals.entry(point.date).or_insert(0.0) += point.value;
        }
    }

    debug!(
        "Aggregated {} stations into {} dates",
        stations.len(),
        totals.len()
    );

    let series = totals
        .into_iter()
        .map(|(date, value)| DailyPoint::new(date, value))
        .collect();

    Station::meta(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 6, day).unwrap()
    }

    fn station(id: &str, points: &[(u32, f64)]) -> Station {
        Station::new(id, id)
            .unwrap()
            .with_series(points.iter().map(|&(d, v)| DailyPoint::new(date(d), v)).collect())
    }

    #[test]
    fn test_sums_by_date() {
        let stations = vec![
            station("A", &[(1, 10.0), (2, 20.0)]),
            station("B", &[(1, 5.0), (3, 7.0)]),
        ];

        let meta = aggregate_stations(&stations);

        assert!(meta.is_meta());
        assert_eq!(
            meta.series,
            vec![
                DailyPoint::new(date(1), 15.0),
                DailyPoint::new(date(2), 20.0),
                DailyPoint::new(date(3), 7.0),
            ]
        );
    }

    #[test]
    fn test_order_independent() {
        let forward = vec![
            station("A", &[(2, 20.0), (1, 10.0)]),
            station("B", &[(1, 5.0), (3, 7.0)]),
            station("C", &[(3, 1.0)]),
        ];
        let reversed: Vec<Station> = forward.iter().rev().cloned().collect();

        assert_eq!(
            aggregate_stations(&forward).series,
            aggregate_stations(&reversed).series
        );
    }

    #[test]
    fn test_empty_input() {
        let meta = aggregate_stations(&[]);
        assert!(meta.series.is_empty());
    }
}
