use order_dashboard::{AppState, Settings, Store, router};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings = Settings::from_env()?;
    if let Some(parent) = settings.db_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let store = Store::new(settings.db_path.clone());
    store.init().await?;
    info!(
        db = %store.path().display(),
        peak_coverage = settings.peak_coverage,
        top_limit = settings.top_limit,
        "order store ready"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let app = router(AppState::new(settings, store));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
