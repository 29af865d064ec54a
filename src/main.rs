mod config;
mod routes;

use std::process::ExitCode;

use leptos::config::get_configuration;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, HostConfig};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: std::net::SocketAddr, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "boxoffice-web failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let host = HostConfig::from_env()?;
    let conf = get_configuration(None).map_err(|e| ConfigError::Leptos(e.to_string()))?;

    let app = routes::app(conf.leptos_options);
    let listener = tokio::net::TcpListener::bind(host.addr)
        .await
        .map_err(|source| StartupError::Bind { addr: host.addr, source })?;

    tracing::info!(addr = %host.addr, "boxoffice-web listening");
    axum::serve(listener, app).await.map_err(StartupError::Serve)
}
