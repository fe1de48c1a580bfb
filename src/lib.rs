//! corona-api: read-only HTTP/JSON API over coronavirus case statistics
//!
//! Serves the full per-country case history and a latest-per-country
//! snapshot out of a single Postgres table. The table is populated by an
//! external ingestion process; this service never writes to it.

pub mod config;
pub mod db;
pub mod http;

pub use config::{AppConfig, ConfigError};
pub use http::{build_router, run_server, AppState, ServerConfig};
