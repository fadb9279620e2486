pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::core::validation::ValidationMode;

/// Load and merge the config JSON files into a single [`EngineConfig`],
/// then apply environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   app.json
///   engine.json
///   markets.json   (optional, reference deployment data otherwise)
/// ```
///
/// # Environment variable overrides
///
/// | Env Var                         | Config Field                        |
/// |---------------------------------|-------------------------------------|
/// | `ENGINE_VALIDATION_MODE`        | `engine.validation_mode`            |
/// | `ENGINE_NO_DEBT_HEALTH_FACTOR`  | `engine.no_debt_health_factor`      |
/// | `ENGINE_GAS_ESTIMATE`           | `engine.gas.estimated_gas`          |
/// | `ENGINE_GAS_USD`                | `engine.gas.gas_usd`                |
/// | `ENGINE_DEMO_ADDRESS`           | `engine.demo_account.address`       |
/// | `ENGINE_LOG_DIR`                | `app.logging.log_dir`               |
pub fn load_config(config_dir: &Path) -> Result<EngineConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let app: AppConfig = serde_json::from_str(&read("app.json")?).context("parsing app.json")?;

    let engine: EngineSection =
        serde_json::from_str(&read("engine.json")?).context("parsing engine.json")?;

    // Markets config is optional.
    let markets: MarketsConfig = match read("markets.json") {
        Ok(contents) => serde_json::from_str(&contents).context("parsing markets.json")?,
        Err(_) => {
            info!("markets.json not found, using reference market data");
            MarketsConfig::default()
        }
    };

    let mut config = EngineConfig {
        app,
        engine,
        markets,
    };

    apply_env_overrides(&mut config);
    validate::validate_config(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides to the loaded config.
///
/// Only non-empty env vars take effect. Parse failures are skipped (the JSON
/// value remains).
fn apply_env_overrides(config: &mut EngineConfig) {
    if let Some(val) = env_parse::<ValidationMode>("ENGINE_VALIDATION_MODE") {
        info!(mode = val.as_str(), "env override: ENGINE_VALIDATION_MODE");
        config.engine.validation_mode = val;
    }

    if let Some(val) = env_decimal("ENGINE_NO_DEBT_HEALTH_FACTOR") {
        info!(%val, "env override: ENGINE_NO_DEBT_HEALTH_FACTOR");
        config.engine.no_debt_health_factor = val;
    }

    // -- Gas quote -----------------------------------------------------------
    if let Some(val) = env_string("ENGINE_GAS_ESTIMATE") {
        info!(%val, "env override: ENGINE_GAS_ESTIMATE");
        config.engine.gas.estimated_gas = val;
    }

    if let Some(val) = env_decimal("ENGINE_GAS_USD") {
        info!(%val, "env override: ENGINE_GAS_USD");
        config.engine.gas.gas_usd = val;
    }

    // -- Demo account --------------------------------------------------------
    if let Some(val) = env_string("ENGINE_DEMO_ADDRESS") {
        if let Some(demo) = config.engine.demo_account.as_mut() {
            info!(address = %val, "env override: ENGINE_DEMO_ADDRESS");
            demo.address = val;
        }
    }

    // -- Logging -------------------------------------------------------------
    if let Some(val) = env_string("ENGINE_LOG_DIR") {
        info!(%val, "env override: ENGINE_LOG_DIR");
        config.app.logging.log_dir = val;
    }
}

/// Read a non-empty env var as a `String`.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty env var and parse it as `T`.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

/// Read a non-empty env var and parse it as `Decimal`.
fn env_decimal(key: &str) -> Option<Decimal> {
    env_string(key).and_then(|v| Decimal::from_str(&v).ok())
}
