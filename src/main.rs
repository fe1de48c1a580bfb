//! corona-api entry point
//!
//! Startup order matters: configuration loads first, the database
//! connection is verified next, and only then does the listener come up.
//! Any failure before the listener binds is fatal.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use corona_api::config::AppConfig;
use corona_api::db;
use corona_api::http::{run_server, ServerConfig};

#[derive(Parser, Debug)]
#[command(
    name = "corona-api",
    version,
    about = "Read-only HTTP/JSON API over country-level coronavirus case statistics"
)]
struct Cli {
    /// Address to bind to
    #[arg(long, short = 'b', default_value = "127.0.0.1:10000")]
    bind: SocketAddr,

    /// Path to a YAML config file with connection parameters
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Database URL (overrides config file and CORONA_DB_* variables)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().ok();
    let cli = Cli::parse();

    let config =
        AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let database_url = cli
        .database_url
        .unwrap_or_else(|| config.database_url());

    let pool = db::create_pool(&database_url)
        .await
        .context("failed to create database pool")?;
    db::ping(&pool)
        .await
        .context("database connection check failed")?;
    tracing::info!("database connection verified");

    let server_config = ServerConfig {
        bind_addr: cli.bind,
        query_timeout: Duration::from_secs(config.query_timeout_secs),
    };
    run_server(pool, server_config).await.context("server error")?;

    Ok(())
}
