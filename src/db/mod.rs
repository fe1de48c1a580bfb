//! Database layer - connection pool and the record repository
//!
//! The pool is opened once at startup and shared by every request; sqlx
//! handles connection reuse internally. All queries here are reads.

pub mod pool;
pub mod records;

pub use pool::{create_pool, ping};
pub use records::{CaseRecord, CountrySnapshot, DbError, RecordRepo};
