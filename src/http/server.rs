//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with health endpoints, service groups and 404 fallback
//! - Wire up middleware (request ID, tracing, panic catching, origin gate, limits)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use axum::{body::Body, middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::{request_span, UuidRequestId, X_REQUEST_ID};
use crate::http::response::panic_response;
use crate::observability::metrics;
use crate::routing::{mount_services, Collaborators, ServiceStatus};
use crate::security::cors::{origin_gate_middleware, OriginGate};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Vec<ServiceStatus>>,
}

/// HTTP front door.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    services: Arc<Vec<ServiceStatus>>,
}

impl HttpServer {
    /// Create a new HTTP server, loading every collaborator up front.
    pub fn new(config: GatewayConfig, collaborators: Collaborators) -> Self {
        let gate = Arc::new(OriginGate::new(&config.cors));

        tracing::info!(
            allowed_origins = ?gate.allowed_origins(),
            origin_match = ?config.cors.origin_match,
            "Origin gate configured"
        );

        let (services_router, statuses) =
            mount_services(Router::new(), &collaborators, config.routing.fallback);
        let services = Arc::new(statuses);

        let router = Self::build_router(&config, gate, services.clone(), services_router);
        Self {
            router,
            config,
            services,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &GatewayConfig,
        gate: Arc<OriginGate>,
        services: Arc<Vec<ServiceStatus>>,
        services_router: Router,
    ) -> Router {
        let health = Router::new()
            .route("/", get(handlers::root))
            .route("/api/health", get(handlers::health))
            .with_state(AppState { services });

        // Layers run bottom-up: the last one added sees the request first.
        health
            .merge(services_router)
            .fallback(handlers::not_found)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(middleware::from_fn_with_state(gate, origin_gate_middleware))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server ready"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for driving the gateway without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Mount outcome for each service.
    pub fn services(&self) -> &[ServiceStatus] {
        &self.services
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
