//! REST API exposure
//!
//! Consumes the resource registry and produces an Axum `Router` with health,
//! record and custom routes, wrapped in request tracing and CORS layers.

use crate::config::ConsoleConfig;
use crate::server::entity_registry::EntityRegistry;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router
    ///
    /// Returns a router with:
    /// - Health check routes
    /// - Record routes of every registered resource
    /// - Custom routes
    pub fn build_router(
        registry: &EntityRegistry,
        config: Arc<ConsoleConfig>,
        custom_routes: Vec<Router>,
    ) -> Router {
        let mut app = Self::health_routes().merge(registry.build_routes(config));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Self::cors_layer()),
        )
    }

    fn cors_layer() -> CorsLayer {
        CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any)
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "admin-console"
        }))
    }
}
