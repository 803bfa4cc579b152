//! Web binding - Serves a mux's HTTP handlers with axum

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::application::errors::BotError;
use crate::application::messaging::Mux;

/// Serve `mux` on `listen` until `ctx` is cancelled
pub async fn serve_web(listen: String, mux: Arc<Mux>, ctx: CancellationToken) -> Result<(), BotError> {
    let listener = TcpListener::bind(&listen)
        .await
        .map_err(|e| BotError::Network(format!("Failed to bind {}: {}", listen, e)))?;
    info!("HTTP handlers for {} listening on http://{}", mux.name(), listen);

    axum::serve(listener, mux.router())
        .with_graceful_shutdown(async move { ctx.cancelled().await })
        .await
        .map_err(|e| BotError::Network(e.to_string()))
}
