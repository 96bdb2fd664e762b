use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use slipkeep_server::{router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let addr: SocketAddr = std::env::var("SLIPKEEP_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3001".to_string())
        .parse()
        .context("invalid SLIPKEEP_ADDR")?;
    let uploads_dir = PathBuf::from(
        std::env::var("SLIPKEEP_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
    );

    tokio::fs::create_dir_all(&uploads_dir)
        .await
        .with_context(|| format!("creating uploads dir {}", uploads_dir.display()))?;

    let app = router(AppState::new(uploads_dir.clone()));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("slipkeep server listening on http://{addr}");
    info!("storing slips under {}", uploads_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install ctrl-c handler");
    }
}
