//! frontdoor gateway binary.
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!   Browser /     │                      FRONTDOOR                       │
//!   client        │  ┌────────────┐   ┌──────────┐   ┌────────────────┐  │
//!  ───────────────┼─▶│ request id │──▶│  origin  │──▶│     router     │──┼──▶ auth / sales /
//!                 │  │  + trace   │   │   gate   │   │ /api/<service> │  │    analytics /
//!                 │  └────────────┘   └────┬─────┘   └───────┬────────┘  │    upload / chatbot
//!                 │                        │ deny            │ no match  │
//!                 │                        ▼                 ▼           │
//!                 │                 ┌─────────────────────────────────┐  │
//!  ◀──────────────┼─────────────────│  error responder / 404 fallback │  │
//!                 │                 └─────────────────────────────────┘  │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

use frontdoor::config::{self, GatewayConfig};
use frontdoor::lifecycle::{bind_listener, signals, Shutdown, StartupError};
use frontdoor::observability::{logging, metrics};
use frontdoor::routing::{Collaborators, Service};
use frontdoor::HttpServer;

#[derive(Parser)]
#[command(name = "frontdoor")]
#[command(about = "CORS-gated HTTP entry point for the frontend sub-services", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long, env = "FRONTDOOR_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Listen address.
    #[arg(long, env = "FRONTDOOR_HOST")]
    host: Option<IpAddr>,
}

fn load(args: &Args) -> Result<GatewayConfig, config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(port) = args.port {
        config.listener.port = port;
    }
    if let Some(host) = args.host {
        config.listener.host = host;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load(&args)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("frontdoor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?args.config,
        bind_address = %config.listener.socket_addr(),
        fallback = ?config.routing.fallback,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // validated at load time
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let collaborators = Collaborators::from_upstreams(&config.services);
    for service in Service::ALL {
        if !collaborators.is_registered(service) {
            tracing::warn!(service = %service, "No upstream configured");
        }
    }

    let addr = config.listener.socket_addr();
    let server = HttpServer::new(config, collaborators);

    let listener = match bind_listener(addr).await {
        Ok(listener) => listener,
        Err(e @ (StartupError::PermissionDenied { .. } | StartupError::AddrInUse { .. })) => {
            tracing::error!(
                error = %e,
                hint = e.remediation().as_deref().unwrap_or(""),
                "Cannot bind listener"
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
