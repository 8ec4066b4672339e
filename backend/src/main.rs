use std::net::SocketAddr;

use audit_dashboard_backend::config::AppConfig;
use audit_dashboard_backend::domain::TokenRenewalTask;
use audit_dashboard_backend::{create_router, initialize_backend};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    let app_state = initialize_backend(&config)?;
    let auth_store = app_state.auth_store.clone();

    let renewal = TokenRenewalTask::spawn(auth_store.clone(), config.renewal_interval);
    let app = create_router(app_state, &config.allowed_origin);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown requested");
        })
        .await?;

    renewal.stop().await;
    auth_store.dispose()?;
    info!("Server stopped");
    Ok(())
}
