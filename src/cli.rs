//! CLI arguments and subcommands for meow-config.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "meow-config",
    about = "HTTP service managing endpoint monitoring configurations",
    long_about = "HTTP service managing endpoint monitoring configurations.\n\n\
                  Endpoint configurations are kept in memory and mirrored to a CSV file \
                  on every write. A Redis-protocol dependency must answer PING at startup.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Listen to address
    #[arg(long)]
    pub addr: Option<IpAddr>,

    /// Listen on port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// CSV file to store the endpoint configuration
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Connection string of the liveness dependency (host:port or redis://host:port)
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Timeout for the startup liveness check in milliseconds
    #[arg(long)]
    pub liveness_timeout_ms: Option<u64>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Enable TLS/SSL for HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate file (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the endpoint CSV file with the startup rules and print its records
    Validate {
        /// CSV file to validate (defaults to the effective --file)
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,
    },

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
