//! CLI entry point
//!
//! Loads configuration, declares the entity model, wires the collaborators
//! and runs the HTTP server. All fallible startup work happens here so that
//! `main` stays a thin error printer.

mod args;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigError};
use crate::schema::{iot_event_model, SchemaError};
use crate::server::GatewayServer;
use crate::storage::MemoryStore;

pub use args::Cli;

/// Startup failures; all fatal
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be resolved
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The entity model failed to declare
    #[error("entity model error: {0}")]
    Schema(#[from] SchemaError),

    /// Runtime construction or listen failure
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the service until the process is stopped
pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = AppConfig::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(namespace) = cli.namespace {
        config.namespace = namespace;
    }

    let registry = Arc::new(iot_event_model(&config.namespace)?);
    let store = Arc::new(MemoryStore::new());
    let server = GatewayServer::new(&config, registry, store);

    tracing::info!(
        addr = %server.socket_addr(),
        namespace = %config.namespace,
        "starting event OData service"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server.start())?;

    Ok(())
}
