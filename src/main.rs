// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// - config:    Configuration structs loaded from JSON
// - schema:    Strongly typed catalog / run / value definitions
// - catalog:   Built-in resource catalog and region list
// - error:     Error taxonomy (fetch + tool level)
// - util:      Time, identifier and HTTP body helpers
// - sources:   Data source adapters and registry
// - collector: Collection orchestrator and run history
// - export:    JSON-LD export and downstream publish relay
// - tools:     Named capability dispatcher
// - rpc:       JSON-RPC envelope and HTTP routes
// - metrics:   Lock-free runtime counters
//
mod catalog;
mod collector;
mod config;
mod error;
mod export;
mod metrics;
mod rpc;
mod schema;
mod sources;
mod tools;
mod util;

#[cfg(test)]
mod testing;

use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use axum::{ServiceExt, extract::Request};
use rustls::crypto::{CryptoProvider, ring};
use tokio::net::TcpListener;

use catalog::Catalog;
use collector::{history::RunHistory, runner::Collector};
use config::{Config, load_config};
use export::{
    jsonld::JsonLdExporter,
    publish::{McpRelayClient, Publisher},
};
use rpc::server::build_app;
use sources::get_source;
use tools::ToolDispatcher;

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// Responsibilities:
// - Initialize cryptography backend (rustls)
// - Load configuration and logging
// - Build history, catalog, source, collector and exporters once
// - Serve the HTTP / JSON-RPC surface until the process ends
//
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // rustls >= 0.23 requires an explicit process-wide CryptoProvider,
    // installed before any HTTPS client is built.
    CryptoProvider::install_default(ring::default_provider())
        .map_err(|_| anyhow!("failed to install rustls CryptoProvider"))?;

    let config_path = env::var("COLLECTOR_CONFIG").unwrap_or_else(|_| "config.json".into());
    let mut config: Config = load_config(&config_path)?;
    if let Ok(addr) = env::var("COLLECTOR_BIND_ADDR") {
        config.server.bind_addr = addr;
    }

    init_logging(config.debug.log);
    if Path::new(&config_path).exists() {
        log::info!("configuration loaded from {}", config_path);
    } else {
        log::info!("no configuration at {}, using defaults", config_path);
    }

    // --------------------------------------------------------
    // Collection engine
    // --------------------------------------------------------
    let source = get_source(&config.source)?
        .ok_or_else(|| anyhow!("data source '{}' is not supported", config.source.name))?;

    let catalog = Catalog::builtin();
    let history = Arc::new(RunHistory::new(config.collection.history_capacity));

    log::info!(
        "source={} resources={} regions={} history_capacity={}",
        source.name(),
        catalog.resources.len(),
        catalog.regions.len(),
        history.capacity()
    );

    let collector = Arc::new(Collector::new(
        source,
        catalog.clone(),
        history.clone(),
        config.collection.fetch_concurrency,
    ));

    // --------------------------------------------------------
    // Exporters + dispatcher
    // --------------------------------------------------------
    let exporter = JsonLdExporter::new(history.clone(), config.export.clone());
    let relay = Arc::new(McpRelayClient::new(&config.publish)?);
    let publisher = Publisher::new(history.clone(), relay, &config.publish);

    let dispatcher = Arc::new(ToolDispatcher::new(
        collector, history, catalog, exporter, publisher,
    ));

    metrics::spawn_reporter(config.debug.metrics_interval_secs);

    // --------------------------------------------------------
    // HTTP surface
    // --------------------------------------------------------
    let app = build_app(dispatcher);
    let listener = TcpListener::bind(&config.server.bind_addr).await?;
    log::info!("listening on {}", config.server.bind_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}

// ------------------------------------------------------------
// Logging
// ------------------------------------------------------------
//
// `RUST_LOG` wins; otherwise info, or debug with `debug.log`.
//
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
