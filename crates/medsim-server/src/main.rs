use std::env;

use anyhow::Context;
use medsim_server::ServerBuilder;
use medsim_server::config::loader::{
    CONFIG_PATH_ENV, explicit_file_missing, load_config, resolve_config_path,
};

#[tokio::main]
async fn main() {
    // .env is optional
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    medsim_server::observability::init_tracing();

    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}

async fn run() -> anyhow::Result<()> {
    let (config_path, source) =
        resolve_config_path(env::args().skip(1), env::var(CONFIG_PATH_ENV).ok());

    if explicit_file_missing(&config_path, source) {
        tracing::warn!(
            path = %config_path,
            source = %source,
            "configuration file not found, using defaults and environment overrides"
        );
    }

    let cfg = load_config(Some(&config_path))
        .map_err(anyhow::Error::msg)
        .context("Configuration error")?;

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    medsim_server::observability::apply_logging_config(&cfg.logging)
        .map_err(anyhow::Error::msg)
        .context("Logging setup failed")?;

    let server = ServerBuilder::new()
        .with_config(cfg)
        .build()
        .map_err(anyhow::Error::msg)
        .context("Server initialization failed")?;

    server.run().await.context("Server error")
}
