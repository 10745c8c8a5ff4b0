//! JobMatch HTTP server
//!
//! Opens the match service (loading the persisted catalogue into the index)
//! and serves the JSON API.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use jobmatch_core::{Config, MatchService};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// JobMatch HTTP API server
#[derive(Parser)]
#[command(name = "jobmatch-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Semantic job-matching HTTP API")]
struct Args {
    /// Directory holding jobmatch.db (overrides JOBMATCH_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "JOBMATCH_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to bind
    #[arg(long, env = "JOBMATCH_PORT", default_value = "3950")]
    port: u16,

    /// Additional allowed CORS origin (repeatable)
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    info!("JobMatch server v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }

    let service = tokio::task::spawn_blocking(move || MatchService::open(config)).await??;
    let service = Arc::new(service);

    let health = service.health();
    if !health.is_ready() {
        warn!(?health, "Serving in degraded mode; POST /api/index/rebuild to recover");
    }

    let mut origins = jobmatch_server::api::local_origins(args.port);
    origins.extend(args.cors_origins);

    let addr = SocketAddr::new(args.host, args.port);
    let served = jobmatch_server::serve(Arc::clone(&service), addr, &origins).await;

    // Blocking HTTP clients inside the provider must not be dropped on a runtime thread
    tokio::task::spawn_blocking(move || drop(service)).await?;
    served
}
