//! Climate Observations API - HTTP server
//!
//! Serves read-only JSON queries over the `measurement` and `station`
//! tables: trailing-year precipitation, station list, most-active-station
//! temperatures, and temperature summaries over date ranges.
//!
//! Usage:
//!   cargo run --release                          # Listen on 127.0.0.1:5000
//!   cargo run --release -- --port 8080 --debug   # Custom port, verbose logs
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string
//!   RUST_LOG     - tracing filter (overrides --debug)

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use climate_api::config::{self, ServiceConfig};
use climate_api::db;
use climate_api::endpoint::EndpointServer;
use climate_api::store::PgStoreSource;

/// Climate Observations API
#[derive(Parser, Debug)]
#[command(name = "climate_api")]
#[command(about = "Read-only JSON API over a climate observations database")]
struct Args {
    /// Listen host
    #[arg(long, env = "CLIMATE_API_HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(short, long, env = "CLIMATE_API_PORT")]
    port: Option<u16>,

    /// Debug logging and error details in responses
    #[arg(long)]
    debug: bool,

    /// Config file (defaults to climate_api.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of request worker threads
    #[arg(long)]
    workers: Option<usize>,
}

impl Args {
    /// Command-line flags win over the config file.
    fn apply_to(&self, config: &mut ServiceConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(workers) = self.workers {
            config.server.workers = workers;
        }
        if self.debug {
            config.server.debug = true;
        }
    }
}

fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    let args = Args::parse();

    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    args.apply_to(&mut config);

    init_tracing(config.server.debug);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.bind_addr(),
        "Starting climate API"
    );

    let pool = match db::connect_and_verify(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Database initialization failed");
            eprintln!("\n{}\n", e);
            std::process::exit(1);
        }
    };
    info!(schema = %config.database.schema, "Database validated");

    let server = match EndpointServer::bind(
        &config.server.bind_addr(),
        config.server.workers,
        config.server.debug,
    ) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Endpoint server error");
            std::process::exit(1);
        }
    };

    server.serve(PgStoreSource::new(pool, &config.database.schema));
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt().with_env_filter(filter).with_target(true).init();
}
