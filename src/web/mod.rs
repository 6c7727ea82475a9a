pub mod handlers;
pub mod routes;

use tokio::sync::broadcast;
use tracing::info;

use crate::error::{EcofertilError, Result};

pub use routes::AppState;

/// Serve the form on `bind` until `shutdown` fires.
pub async fn serve(
    bind: &str,
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let app = routes::build(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| EcofertilError::Config(format!("failed to bind {bind}: {e}")))?;

    info!(bind = %bind, "web form listening (HTTP)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    Ok(())
}
