//! confgate node.
//!
//! Loads the bootstrap configuration, builds the registry of built-in roots
//! and serves the management REST endpoint until SIGINT/SIGTERM.
//!
//! ```text
//!   --config file ──▶ loader ──▶ Registry ──▶ ConfigurationPresentation ──▶ RestServer
//!                                   ▲                                          │
//!   file change ──▶ ConfigWatcher ──┘          GET/POST /management/v1/configuration
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use confgate::http::{bind_rest_endpoint, RestServer};
use confgate::lifecycle::{signals, Shutdown};
use confgate::node::{apply_reloads, load_bootstrap, ConfigWatcher};
use confgate::observability::{logging, metrics};
use confgate::presentation::{converter, ConfigurationPresentation, Format};
use confgate::storage::{ConfigurationStorage, FileStorage, InMemoryStorage};
use confgate::modules;

#[derive(Parser)]
#[command(name = "confgate")]
#[command(about = "Node with a validated, persistent configuration tree", long_about = None)]
struct Args {
    /// Bootstrap configuration file (.json, .conf, .hocon or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory where committed configuration is persisted
    #[arg(short, long)]
    work_dir: Option<PathBuf>,

    /// Reload the bootstrap file when it changes
    #[arg(long)]
    watch: bool,

    /// Address for the Prometheus scrape endpoint
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    /// Address the REST endpoint binds to
    #[arg(long, default_value = "0.0.0.0")]
    host: Ipv4Addr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(logging::DEFAULT_FILTER);

    tracing::info!("confgate v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(addr) = args.metrics_address {
        metrics::init_metrics(addr);
    }

    let bootstrap = match &args.config {
        Some(path) => load_bootstrap(path)?,
        None => serde_json::json!({}),
    };

    let storage: Arc<dyn ConfigurationStorage> = match &args.work_dir {
        Some(dir) => Arc::new(FileStorage::open(dir)?),
        None => Arc::new(InMemoryStorage::new()),
    };

    let registry = Arc::new(modules::build_registry(&bootstrap, storage)?);
    tracing::info!(
        roots = ?registry.names().collect::<Vec<_>>(),
        config = ?args.config,
        work_dir = ?args.work_dir,
        "Configuration loaded"
    );

    // Dropping the watcher handle stops it, so it lives as long as main.
    let _watcher = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            tokio::spawn(apply_reloads(registry.clone(), updates));
            Some(handle)
        }
        _ => None,
    };

    let listener = bind_rest_endpoint(args.host, &registry).await?;
    let presentation = ConfigurationPresentation::new(registry, converter(Format::Json));
    let server = RestServer::new(presentation);

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal(&signal_shutdown).await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("confgate stopped");
    Ok(())
}
