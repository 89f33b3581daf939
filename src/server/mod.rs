//! Prediction service
//!
//! HTTP endpoint serving the production model. The model and preprocessor
//! are loaded from the registry's production alias once at startup; there is
//! no cache invalidation or hot reload.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use crate::config::PipelineConfig;
use crate::pipeline::Predictor;

/// Server bind settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
        }
    }
}

/// Load the production model once, then serve until interrupted
pub async fn run_server(
    server_config: ServerConfig,
    pipeline_config: PipelineConfig,
) -> anyhow::Result<()> {
    let predictor = Predictor::load(&pipeline_config.registry).await?;
    let state = Arc::new(AppState::new(pipeline_config, predictor));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "prediction service listening");

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        info!("shutdown signal received, stopping server");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("server shut down cleanly");
    Ok(())
}
