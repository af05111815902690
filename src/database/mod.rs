//! SQLite access for the history store.

pub mod pool;

pub use pool::{open_read_only_pool, Database, DatabaseError};
