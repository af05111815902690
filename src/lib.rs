//! Gastrak Library
//!
//! Fuel price observations for a set of stations, reloaded periodically into
//! an immutable snapshot and served over HTTP in several encodings.

pub mod config;
pub mod database;
pub mod encode;
pub mod error;
pub mod http;
pub mod loader;
pub mod models;
pub mod publisher;
pub mod query;
pub mod refresher;
pub mod source;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, LoadError, QueryError};
pub use publisher::SnapshotPublisher;
pub use refresher::{RefreshHandle, Refresher};
