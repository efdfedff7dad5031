//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use malscan_core::Config;
use tokio_util::sync::CancellationToken;

/// Start the server with graceful shutdown. `shutdown` is cancelled once a
/// signal arrives so in-flight scans stop polling.
pub async fn start_server(config: &Config, app: Router, shutdown: CancellationToken) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        reports_dir = %config.reports_dir().display(),
        uploads_dir = %config.uploads_dir().display(),
        poll_interval_secs = config.scan.poll_interval_secs,
        max_wait_secs = config.scan.max_wait_secs,
        smtp_configured = config.smtp.is_configured(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    malscan_infra::shutdown_telemetry().await;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
    shutdown.cancel();
}
