//! Filtering and projection over a snapshot sequence.
//!
//! Everything here is synchronous and order preserving; the engine never
//! sorts its input.

use crate::error::QueryError;
use crate::models::Observation;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Conjunctive filter. Omitted criteria impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Case-insensitive exact station name
    pub name: Option<String>,
    /// Grade name; an observation passes only if it has a price for it
    pub grade: Option<String>,
}

impl Filter {
    pub fn new(name: Option<String>, grade: Option<String>) -> Self {
        Self {
            name: non_empty(name),
            grade: non_empty(grade),
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self::new(Some(name.into()), None)
    }

    pub fn by_grade(grade: impl Into<String>) -> Self {
        Self::new(None, Some(grade.into()))
    }

    pub fn matches(&self, observation: &Observation) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .map_or(true, |name| observation.station.name_matches(name));
        let grade_ok = self
            .grade
            .as_deref()
            .map_or(true, |grade| observation.grade_price(grade).is_some());
        name_ok && grade_ok
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// One point of a price time series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

/// Time series split into two parallel columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransposedSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub prices: Vec<Decimal>,
}

/// Observations passing `filter`, in input order
pub fn filter<'a>(observations: &'a [Observation], filter: &Filter) -> Vec<&'a Observation> {
    observations.iter().filter(|o| filter.matches(o)).collect()
}

/// Project passing observations onto `(timestamp, price)` for the filter's
/// grade. The grade is required.
pub fn time_series(observations: &[Observation], filter: &Filter) -> Result<Vec<PricePoint>, QueryError> {
    let grade = required_grade(filter)?;

    Ok(observations
        .iter()
        .filter(|o| filter.matches(o))
        .filter_map(|o| {
            o.grade_price(grade).map(|price| PricePoint {
                timestamp: o.timestamp,
                price,
            })
        })
        .collect())
}

/// Same as [`time_series`], as two parallel columns
pub fn time_series_transposed(
    observations: &[Observation],
    filter: &Filter,
) -> Result<TransposedSeries, QueryError> {
    let points = time_series(observations, filter)?;
    let (timestamps, prices) = points.into_iter().map(|p| (p.timestamp, p.price)).unzip();
    Ok(TransposedSeries { timestamps, prices })
}

fn required_grade(filter: &Filter) -> Result<&str, QueryError> {
    filter
        .grade
        .as_deref()
        .filter(|g| !g.is_empty())
        .ok_or_else(|| QueryError::InvalidInput("a `grade` is required for a time series".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Station;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn observation(secs: i64, name: &str, regular: Option<i64>, diesel: Option<i64>) -> Observation {
        Observation {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            station: Arc::new(Station::new(secs, name, 47.0, -122.0)),
            regular_price: regular.map(|cents| Decimal::new(cents, 2)),
            premium_price: None,
            diesel_price: diesel.map(|cents| Decimal::new(cents, 2)),
        }
    }

    fn sample() -> Vec<Observation> {
        vec![
            observation(1, "Store1", Some(399), None),
            observation(2, "Store2", None, Some(449)),
        ]
    }

    #[test]
    fn test_filter_conjunction() {
        let data = sample();

        let by_name = filter(&data, &Filter::by_name("Store1"));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].station.name, "Store1");

        let by_grade = filter(&data, &Filter::by_grade("diesel"));
        assert_eq!(by_grade.len(), 1);
        assert_eq!(by_grade[0].station.name, "Store2");

        let both = filter(&data, &Filter::new(Some("Store1".into()), Some("diesel".into())));
        assert!(both.is_empty());
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let data = sample();
        assert_eq!(filter(&data, &Filter::default()).len(), 2);
        assert_eq!(filter(&data, &Filter::new(Some(String::new()), Some(String::new()))).len(), 2);
    }

    #[test]
    fn test_name_and_grade_ignore_case() {
        let data = sample();
        assert_eq!(filter(&data, &Filter::by_name("STORE2")).len(), 1);
        assert_eq!(filter(&data, &Filter::by_grade("Regular")).len(), 1);
    }

    #[test]
    fn test_unknown_grade_matches_nothing() {
        let data = sample();
        assert!(filter(&data, &Filter::by_grade("hydrogen")).is_empty());
    }

    #[test]
    fn test_time_series_requires_grade() {
        let data = sample();
        let err = time_series(&data, &Filter::by_name("Store1")).unwrap_err();
        assert!(matches!(err, QueryError::InvalidInput(_)));
    }

    #[test]
    fn test_time_series_projection_keeps_order() {
        let data = vec![
            observation(30, "Store1", Some(409), None),
            observation(10, "Store1", Some(399), None),
            observation(20, "Store1", None, Some(450)),
        ];
        let filter = Filter::new(Some("store1".into()), Some("regular".into()));

        let points = time_series(&data, &filter).unwrap();
        let pairs: Vec<(i64, Decimal)> = points
            .iter()
            .map(|p| (p.timestamp.timestamp(), p.price))
            .collect();
        assert_eq!(pairs, vec![(30, Decimal::new(409, 2)), (10, Decimal::new(399, 2))]);

        let transposed = time_series_transposed(&data, &filter).unwrap();
        assert_eq!(transposed.timestamps.len(), 2);
        assert_eq!(transposed.prices, vec![Decimal::new(409, 2), Decimal::new(399, 2)]);
    }
}
