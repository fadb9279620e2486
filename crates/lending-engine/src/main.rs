use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use lending_engine::api;
use lending_engine::config;
use lending_engine::core::LendingEngine;
use lending_engine::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    let config_dir = std::env::var("ENGINE_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let config = config::load_config(&config_dir)?;

    // Hold the guard for the process lifetime.
    let _guard = logging::init_tracing(&config.app.logging)?;

    info!(
        config_dir = %config_dir.display(),
        validation_mode = %config.engine.validation_mode,
        networks = config.markets.networks.len(),
        markets = config.markets.markets.len(),
        "lending engine starting"
    );

    let engine = LendingEngine::from_config(&config).context("failed to build engine")?;

    // -----------------------------------------------------------------------
    // Shutdown on Ctrl+C
    // -----------------------------------------------------------------------

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown signal received"),
            Err(e) => error!(error = %e, "failed to listen for Ctrl+C"),
        }
        signal_token.cancel();
    });

    // -----------------------------------------------------------------------
    // JSON-lines loop: one response line per request line
    // -----------------------------------------------------------------------

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut served: u64 = 0;

    info!("serving requests on stdin");

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line.context("failed to read request line")?,
        };
        let Some(line) = line else {
            debug!("stdin closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let mut response = api::handle_line(&engine, &line);
        response.push('\n');
        stdout
            .write_all(response.as_bytes())
            .await
            .context("failed to write response")?;
        stdout.flush().await.context("failed to flush stdout")?;
        served += 1;
    }

    info!(served, "shutdown complete");
    Ok(())
}
