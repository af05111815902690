//! Domain models for gastrak.
//!
//! Stations, the observations recorded against them, and the snapshot that
//! bundles one load of both data sets.

pub mod grade;
pub mod observation;
pub mod snapshot;
pub mod station;

pub use grade::Grade;
pub use observation::Observation;
pub use snapshot::{Series, Snapshot};
pub use station::Station;
