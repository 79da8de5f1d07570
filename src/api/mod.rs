//! HTTP API server

pub mod health;
pub mod trigger;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::config::ApiServerConfig;
use crate::pipeline::Pipeline;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Pipeline each trigger spawns a worker for
    pub pipeline: Arc<Pipeline>,
    /// Name used in the trigger acknowledgement
    pub assistant_name: String,
    /// Whether a headline provider is configured
    pub news_configured: bool,
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub fn new(state: ApiState, config: &ApiServerConfig) -> Self {
        Self {
            state: Arc::new(state),
            host: config.host.clone(),
            port: config.port,
        }
    }

    /// Build the router with all routes and layers
    #[must_use]
    pub fn router(&self) -> Router {
        let router = Router::new()
            .merge(trigger::router(self.state.clone()))
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()));

        // The trigger is called from a browser frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server on {addr}: {e}")))?;

        tracing::info!(%addr, "API server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
