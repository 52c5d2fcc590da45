//! `dialogstore serve`: run the RPC server until Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::Result;

use dialogstore_types::config::AppConfig;

use crate::http::router::build_router;
use crate::state::AppState;

pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = AppState::init(&config.database).await?;
    let service = Arc::clone(&state.dialog_service);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Dialogstore RPC listening on {} ({} driver)",
        console::style("●").bold(),
        console::style(format!("http://{addr}")).cyan(),
        config.database.driver
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and its state are gone once serve returns.
    match Arc::try_unwrap(service) {
        Ok(service) => service.end_session().await,
        Err(_) => tracing::warn!("dialog service still shared at shutdown, store left open"),
    }

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
