//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::{EntityRegistry, RecordDescriptor};
use super::exposure::RestExposure;
use crate::config::ConsoleConfig;
use crate::core::record::Record;
use crate::core::service::RecordService;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating HTTP servers with auto-registered record routes
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(ConsoleConfig::default_config())
///     .register_service::<Role, _>(InMemoryRecordService::new())
///     .register_service::<Privilege, _>(InMemoryRecordService::new())
///     .build();
/// ```
pub struct ServerBuilder {
    entity_registry: EntityRegistry,
    configs: Vec<ConsoleConfig>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            entity_registry: EntityRegistry::new(),
            configs: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Add a configuration; several are merged, later ones winning
    pub fn with_config(mut self, config: ConsoleConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints outside the search/get/save/delete pattern.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Expose a record type through a shared service
    pub fn register<T: Record>(mut self, service: Arc<dyn RecordService<T>>) -> Self {
        tracing::debug!(resource = T::resource_name(), "registering record routes");
        self.entity_registry
            .register(Box::new(RecordDescriptor::new(service)));
        self
    }

    /// Expose a record type through an owned service
    pub fn register_service<T, S>(self, service: S) -> Self
    where
        T: Record,
        S: RecordService<T> + 'static,
    {
        self.register::<T>(Arc::new(service))
    }

    /// Registered resource names, in registration order
    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }

    fn merged_config(&self) -> ConsoleConfig {
        if self.configs.is_empty() {
            ConsoleConfig::default_config()
        } else {
            ConsoleConfig::merge(self.configs.clone())
        }
    }

    /// Build the final REST router
    ///
    /// Without any configuration, [`ConsoleConfig::default_config`] applies.
    pub fn build(mut self) -> Router {
        let config = Arc::new(self.merged_config());
        let custom_routes = std::mem::take(&mut self.custom_routes);
        RestExposure::build_router(&self.entity_registry, config, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
