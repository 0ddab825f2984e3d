use std::env;

use healthhub_db_memory::create_storage;
use healthhub_server::{AppState, bootstrap, build_router, load_config};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From HEALTHHUB_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (healthhub.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (HEALTHHUB_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config"
            && let Some(path) = args.next()
        {
            return (path, ConfigSource::CliArgument);
        }
    }
    if let Ok(path) = env::var("HEALTHHUB_CONFIG") {
        return (path, ConfigSource::EnvironmentVariable);
    }
    ("healthhub.toml".to_string(), ConfigSource::Default)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown signal handler");
        return;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present; optional for local development.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }

    let (config_path, source) = resolve_config_path();
    let config = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    healthhub_server::observability::init_tracing(&config.logging.level);
    tracing::info!(path = %config_path, source = %source, "configuration loaded");

    let (registry, clinical) = create_storage();
    tracing::info!(backend = clinical.backend_name(), "storage initialized");

    let state = AppState::new(
        registry.clone(),
        clinical,
        config.auth.pharmacy_service_key.clone(),
    );
    let seeded = bootstrap::seed(&registry, &config).await?;
    tracing::info!(hospital = %seeded.hospital.id, "default hospital ready");

    let app = build_router(state, config.request_timeout());
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}
