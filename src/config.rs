//! Configuration management for meow-config.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_FILE: &str = "config.csv";
pub const DEFAULT_REDIS_URL: &str = "localhost:6380";
pub const DEFAULT_LIVENESS_TIMEOUT_MS: u64 = 2000;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub bind: Option<String>,
    pub port: Option<u16>,

    // Endpoint store
    pub file: Option<PathBuf>,

    // Liveness dependency
    #[serde(alias = "redis-url")]
    pub redis_url: Option<String>,
    #[serde(alias = "liveness-timeout-ms")]
    pub liveness_timeout_ms: Option<u64>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,

    // TLS/SSL Configuration
    #[serde(alias = "enable-tls")]
    pub enable_tls: Option<bool>,
    #[serde(alias = "tls-cert-path")]
    pub tls_cert_path: Option<String>,
    #[serde(alias = "tls-key-path")]
    pub tls_key_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            file: Some(PathBuf::from(DEFAULT_FILE)),
            redis_url: Some(DEFAULT_REDIS_URL.to_string()),
            liveness_timeout_ms: Some(DEFAULT_LIVENESS_TIMEOUT_MS),
            enable_health: Some(true),
            enable_tls: Some(false),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Config {
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE))
    }

    pub fn redis_url(&self) -> &str {
        self.redis_url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.port == Some(0) {
        return Err("port must be greater than 0".into());
    }

    if let Some(bind) = cfg.bind.as_deref() {
        if bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address '{}'", bind).into());
        }
    }

    if cfg
        .file
        .as_ref()
        .is_some_and(|f| f.as_os_str().is_empty())
    {
        return Err("file must not be empty".into());
    }

    if cfg
        .redis_url
        .as_deref()
        .is_some_and(|u| u.trim().is_empty())
    {
        return Err("redis_url must not be empty".into());
    }

    if cfg.liveness_timeout_ms == Some(0) {
        return Err("liveness_timeout_ms must be greater than 0".into());
    }

    // TLS validation
    if cfg.enable_tls.unwrap_or(false) {
        let cert_path = cfg.tls_cert_path.as_deref();
        let key_path = cfg.tls_key_path.as_deref();

        match (cert_path, key_path) {
            (None, None) => {
                return Err(
                    "TLS is enabled but neither tls_cert_path nor tls_key_path are set".into(),
                );
            }
            (Some(_), None) => {
                return Err("TLS is enabled but tls_key_path is not set".into());
            }
            (None, Some(_)) => {
                return Err("TLS is enabled but tls_cert_path is not set".into());
            }
            (Some(cert), Some(key)) => {
                check_pem_file(cert, "certificate")?;
                check_pem_file(key, "private key")?;
            }
        }
    }

    Ok(())
}

/// Checks that a TLS PEM file exists, is readable and is not empty.
fn check_pem_file(path: &str, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("TLS {} file not found: {}", what, path).into());
    }
    match fs::metadata(p) {
        Ok(meta) if meta.len() == 0 => Err(format!("TLS {} file is empty: {}", what, path).into()),
        Err(e) => {
            Err(format!("TLS {} file is not readable: {} ({})", what, path, e).into())
        }
        Ok(_) => Ok(()),
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(addr) = args.addr {
        config.bind = Some(addr.to_string());
    }
    if let Some(port) = args.port {
        config.port = Some(port);
    }
    if let Some(file) = &args.file {
        config.file = Some(file.clone());
    }
    if let Some(redis_url) = &args.redis_url {
        config.redis_url = Some(redis_url.clone());
    }
    if let Some(timeout_ms) = args.liveness_timeout_ms {
        config.liveness_timeout_ms = Some(timeout_ms);
    }

    if args.disable_health {
        config.enable_health = Some(false);
    }

    // TLS configuration: CLI wins if provided
    if args.enable_tls {
        config.enable_tls = Some(true);
    }
    if let Some(cert_path) = &args.tls_cert {
        config.tls_cert_path = Some(cert_path.to_string_lossy().to_string());
    }
    if let Some(key_path) = &args.tls_key {
        config.tls_key_path = Some(key_path.to_string_lossy().to_string());
    }

    Ok(config)
}

/// Configuration loading with multiple format support.
///
/// Without an explicit path the default locations are searched; if none
/// exists the built-in defaults are used. An explicit path that does not
/// exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => {
            let defaults = [
                "/etc/meow/config-server.yaml",
                "/etc/meow/config-server.yml",
                "/etc/meow/config-server.json",
                "./meow-config.yaml",
                "./meow-config.yml",
                "./meow-config.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)?;

    // Missing keys fall back to defaults field by field
    let loaded: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            config
        }
        Some("toml") => {
            let config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            config
        }
        _ => {
            // Default to YAML
            let config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            config
        }
    };

    Ok(merge_with_defaults(loaded))
}

fn merge_with_defaults(loaded: Config) -> Config {
    let defaults = Config::default();
    Config {
        bind: loaded.bind.or(defaults.bind),
        port: loaded.port.or(defaults.port),
        file: loaded.file.or(defaults.file),
        redis_url: loaded.redis_url.or(defaults.redis_url),
        liveness_timeout_ms: loaded.liveness_timeout_ms.or(defaults.liveness_timeout_ms),
        enable_health: loaded.enable_health.or(defaults.enable_health),
        enable_tls: loaded.enable_tls.or(defaults.enable_tls),
        tls_cert_path: loaded.tls_cert_path,
        tls_key_path: loaded.tls_key_path,
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}
