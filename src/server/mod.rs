//! HTTP transport
//!
//! Owns the axum server: router construction, CORS and auth layers, and the
//! listen loop. All protocol behavior lives in [`crate::odata`]; this module
//! only moves requests in and responses out.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::auth::AccessGate;
use crate::config::AppConfig;
use crate::odata::ODataGateway;
use crate::schema::EntityRegistry;
use crate::storage::DocumentStore;

pub use routes::{build_router, AppState};

/// The assembled HTTP server
pub struct GatewayServer {
    addr: String,
    router: Router,
}

impl GatewayServer {
    /// Wire the registry, store and gate into a serveable router
    pub fn new(
        config: &AppConfig,
        registry: Arc<EntityRegistry>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let state = Arc::new(AppState {
            gateway: ODataGateway::new(registry, store),
            gate: AccessGate::new(config.users.clone(), config.passwords.clone()),
        });
        let router = build_router(state, &config.cors_origins);

        Self {
            addr: config.socket_addr(),
            router,
        }
    }

    /// Listen address in `host:port` form
    pub fn socket_addr(&self) -> &str {
        &self.addr
    }

    /// The router, for in-process exercising in tests
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind and serve until the process exits
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{err}")))?;

        tracing::info!(%addr, "event OData service listening");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::iot_event_model;
    use crate::storage::MemoryStore;

    fn test_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            namespace: "iothub".to_string(),
            cors_origins: Vec::new(),
            users: vec!["u".to_string()],
            passwords: vec!["p".to_string()],
        }
    }

    #[test]
    fn test_server_creation() {
        let registry = Arc::new(iot_event_model("iothub").unwrap());
        let server = GatewayServer::new(&test_config(), registry, Arc::new(MemoryStore::new()));
        assert_eq!(server.socket_addr(), "127.0.0.1:8080");
        let _router = server.router();
    }
}
