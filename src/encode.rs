//! Output encodings for observation sequences.
//!
//! Absent prices stay absent in every encoding: an empty CSV field, a
//! missing JSON key. They are never written as zero.

use crate::error::{AppError, AppResult};
use crate::models::Observation;
use crate::query::{self, Filter, PricePoint, TransposedSeries};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Output format requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    TimeSeries,
    TimeSeriesTransposed,
}

impl Format {
    /// Parse a format name, ignoring case. Empty or missing means CSV.
    pub fn parse(s: Option<&str>) -> Option<Self> {
        match s.map(str::to_lowercase).as_deref() {
            None | Some("") | Some("csv") => Some(Format::Csv),
            Some("json") => Some(Format::Json),
            Some("timeseries") => Some(Format::TimeSeries),
            Some("timeseries-transposed") => Some(Format::TimeSeriesTransposed),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Csv => CSV_CONTENT_TYPE,
            _ => JSON_CONTENT_TYPE,
        }
    }
}

/// An encoded response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Filter `observations` and encode the result in `format`.
///
/// Time-series formats need both a station name and a grade.
pub fn render(format: Format, observations: &[Observation], filter: &Filter) -> AppResult<Rendered> {
    let body = match format {
        Format::Csv => to_csv(&query::filter(observations, filter))?,
        Format::Json => to_json(&query::filter(observations, filter))?,
        Format::TimeSeries | Format::TimeSeriesTransposed => {
            if filter.name.is_none() || filter.grade.is_none() {
                return Err(AppError::Validation(
                    "must specify `name` and `grade` parameters".to_string(),
                ));
            }
            if format == Format::TimeSeries {
                time_series_json(&query::time_series(observations, filter)?)?
            } else {
                transposed_json(&query::time_series_transposed(observations, filter)?)?
            }
        }
    };

    Ok(Rendered {
        content_type: format.content_type(),
        body,
    })
}

fn price_field(price: Option<Decimal>) -> String {
    price.map(|p| p.normalize().to_string()).unwrap_or_default()
}

/// Headerless CSV in source column order
pub fn to_csv(observations: &[&Observation]) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for obs in observations {
        writer.write_record([
            obs.timestamp.timestamp().to_string(),
            obs.station.id.to_string(),
            obs.station.name.clone(),
            obs.station.latitude.to_string(),
            obs.station.longitude.to_string(),
            price_field(obs.regular_price),
            price_field(obs.premium_price),
            price_field(obs.diesel_price),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Message(format!("failed to flush csv: {}", e)))
}

/// JSON view of one observation
#[derive(Debug, Serialize)]
pub struct ObservationRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub id: i64,
    pub name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub premium_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub diesel_price: Option<Decimal>,
}

impl<'a> From<&'a Observation> for ObservationRecord<'a> {
    fn from(obs: &'a Observation) -> Self {
        Self {
            timestamp: obs.timestamp,
            id: obs.station.id,
            name: &obs.station.name,
            latitude: obs.station.latitude,
            longitude: obs.station.longitude,
            regular_price: obs.regular_price,
            premium_price: obs.premium_price,
            diesel_price: obs.diesel_price,
        }
    }
}

pub fn records<'a>(observations: &[&'a Observation]) -> Vec<ObservationRecord<'a>> {
    observations.iter().map(|o| ObservationRecord::from(*o)).collect()
}

pub fn to_json(observations: &[&Observation]) -> AppResult<Vec<u8>> {
    Ok(serde_json::to_vec(&records(observations))?)
}

#[derive(Debug, Serialize)]
struct FloatPrice(#[serde(with = "rust_decimal::serde::float")] Decimal);

/// `[[unix_seconds, price], ...]`
pub fn time_series_json(points: &[PricePoint]) -> AppResult<Vec<u8>> {
    let pairs: Vec<(i64, FloatPrice)> = points
        .iter()
        .map(|p| (p.timestamp.timestamp(), FloatPrice(p.price)))
        .collect();
    Ok(serde_json::to_vec(&pairs)?)
}

/// `[[unix_seconds...], [price...]]`
pub fn transposed_json(series: &TransposedSeries) -> AppResult<Vec<u8>> {
    let timestamps: Vec<i64> = series.timestamps.iter().map(|t| t.timestamp()).collect();
    let prices: Vec<FloatPrice> = series.prices.iter().copied().map(FloatPrice).collect();
    Ok(serde_json::to_vec(&(timestamps, prices))?)
}
