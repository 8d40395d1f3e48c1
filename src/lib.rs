use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

pub mod channels;
pub mod config;
pub mod context;
pub mod csrf;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod routes;
pub mod sanitize;
pub mod submission;
pub mod utils;

use config::Config;
use context::AppContext;

/// Binds the listener and serves the intake router until shutdown.
pub async fn run(config: Config) -> Result<()> {
    let port = config.port;
    let app_context = Arc::new(AppContext::new(Arc::new(config)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Intake server listening");

    let app = routes::create_router(app_context);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Intake server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
