//! Startup requirement validation for meow-config.
//!
//! The service must not start serving unless the liveness dependency answers
//! and the endpoint CSV file (if present) loads completely.

use anyhow::Context;
use meow_config::{ConfigStore, LivenessCheck};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_LIVENESS_TIMEOUT_MS};

/// Validate all runtime requirements and open the endpoint store.
pub async fn validate_requirements(config: &Config) -> anyhow::Result<ConfigStore> {
    info!("🔍 Validating runtime requirements...");

    check_liveness(config).await?;
    let store = open_store(&config.file_path())?;

    info!("✅ All runtime requirements validated");
    Ok(store)
}

/// Ping the liveness dependency once.
pub async fn check_liveness(config: &Config) -> anyhow::Result<()> {
    let timeout = Duration::from_millis(
        config
            .liveness_timeout_ms
            .unwrap_or(DEFAULT_LIVENESS_TIMEOUT_MS),
    );
    let check = LivenessCheck::new(config.redis_url(), timeout)?;
    debug!("Checking liveness dependency at {}", check.address());

    check
        .ping()
        .await
        .with_context(|| format!("Could not connect to Redis at {}", check.address()))?;

    info!("✅ Liveness dependency reachable at {}", check.address());
    Ok(())
}

/// Load the endpoint store, failing on any unparsable row.
pub fn open_store(path: &Path) -> anyhow::Result<ConfigStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            warn!(
                "⚠️  Directory {} does not exist - writes will fail until it is created",
                parent.display()
            );
        }
    }

    let store = ConfigStore::open(path)
        .with_context(|| format!("The config file '{}' is malformed", path.display()))?;

    info!(
        "✅ Endpoint store ready with {} endpoint(s) from {}",
        store.len()?,
        path.display()
    );
    Ok(store)
}
