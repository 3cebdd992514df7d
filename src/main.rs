//! route-dispatch
//!
//! Serves a route tree declared in TOML.
//!
//! # Architecture Overview
//!
//! ```text
//!   dispatch.toml ──▶ config ──▶ routes ─────────┐
//!                                                ▼
//!   builtins ──▶ Registry (frozen) ──▶ RouterBuilder ──▶ DispatchTable
//!                                                            │
//!                                                            ▼
//!   Client ◀──▶ net (idle, TLS) ◀──▶ HttpServer ◀──▶ Dispatcher
//!                                        ▲
//!   SIGINT/SIGTERM ──▶ Shutdown ─────────┘ stop(grace)
//! ```

use std::path::PathBuf;

use clap::Parser;

use route_dispatch::config::load_config;
use route_dispatch::http::HttpServer;
use route_dispatch::lifecycle::{forward_signals, Shutdown};
use route_dispatch::registry::Registry;
use route_dispatch::routing::{RouterBuilder, RouterOptions};
use route_dispatch::{builtins, observability};

#[derive(Debug, Parser)]
#[command(name = "route-dispatch", version, about = "Declarative HTTP dispatch server")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "dispatch.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    observability::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        server = %config.server.name,
        "route-dispatch starting"
    );

    // Everything name-based is resolved here, before a socket is opened.
    let registry = builtins::register(Registry::builder())?.build();
    let table = RouterBuilder::new(&registry)
        .options(RouterOptions::from(&config.router))
        .build(&config.routes)?;
    let global_middleware = config
        .server
        .global_middleware
        .iter()
        .map(|name| registry.resolve_middleware(name))
        .collect::<Result<Vec<_>, _>>()?;

    let server = HttpServer::new(&config.server, table)?.with_global_middleware(global_middleware);

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    forward_signals(shutdown);

    server.run_until_shutdown(signal, config.shutdown.grace()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
