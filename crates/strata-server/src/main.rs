//! strata-server - REST API server binary.

use std::net::SocketAddr;

use secrecy::SecretString;
use strata_core::config::StrataConfig;
use strata_server::{create_runtime, create_server};
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

fn load_config() -> Result<StrataConfig, Box<dyn std::error::Error>> {
    match std::env::var("STRATA_CONFIG_FILE") {
        Ok(path) => {
            info!(path = %path, "Loading configuration file");
            Ok(StrataConfig::from_file(path)?)
        }
        Err(_) => Ok(StrataConfig::from_env()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("strata_server=debug".parse()?),
        )
        .init();

    let host = std::env::var("STRATA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("STRATA_PORT")
        .unwrap_or_else(|_| "5001".to_string())
        .parse()?;
    let api_key = std::env::var("STRATA_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .map(SecretString::new);

    let config = load_config()?;
    let mut runtime = create_runtime(config).await?;

    runtime.scheduler.start().await?;
    info!(
        interval_secs = runtime.scheduler.interval().as_secs(),
        "Sweep scheduler started"
    );

    if api_key.is_some() {
        info!("Authentication enabled");
    } else {
        info!("Authentication disabled");
    }
    let app = create_server(runtime.state.clone(), api_key);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting strata-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, stopping sweep scheduler...");
        })
        .await?;

    // Waits for an in-flight sweep to finish.
    runtime.scheduler.shutdown().await?;

    info!("Server stopped cleanly");
    Ok(())
}
