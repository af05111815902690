use super::{Grade, Station};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

/// One fuel-price reading for a station at an instant.
///
/// A `None` price means the grade was not sold there at that time. It is
/// never conflated with a price of zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub station: Arc<Station>,
    pub regular_price: Option<Decimal>,
    pub premium_price: Option<Decimal>,
    pub diesel_price: Option<Decimal>,
}

impl Observation {
    /// Price for a grade
    pub fn price(&self, grade: Grade) -> Option<Decimal> {
        match grade {
            Grade::Regular => self.regular_price,
            Grade::Premium => self.premium_price,
            Grade::Diesel => self.diesel_price,
        }
    }

    /// Price for a grade given by name. Lenient: an unrecognised grade name
    /// is reported as absent instead of failing.
    pub fn grade_price(&self, grade: &str) -> Option<Decimal> {
        Grade::parse(grade).and_then(|g| self.price(g))
    }
}
