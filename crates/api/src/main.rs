use anyhow::Context;
use subtrack_api::{create_router, telemetry, AppState, Config};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    telemetry::init_tracing(config.env);

    tracing::info!(
        env = config.env.as_str(),
        address = %config.bind_address,
        "Initializing server"
    );

    let pool = subtrack_shared::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    subtrack_shared::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database ready");

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    let shutdown_grace = config.shutdown_grace;

    let app = create_router(AppState::new(pool.clone(), config));

    tracing::info!(addr = %listener.local_addr()?, "Starting server");

    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = signal_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    tracing::info!("Shutting down server");
    let _ = signal_tx.send(());

    match tokio::time::timeout(shutdown_grace, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error during shutdown"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed"),
        Err(_) => tracing::warn!(
            grace_secs = shutdown_grace.as_secs(),
            "In-flight requests did not finish before the shutdown deadline"
        ),
    }

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
}
