//! CLI command implementations for meow-config.
//!
//! This module provides implementations for all CLI subcommands:
//! - `validate`: Endpoint CSV file validation
//! - `config`: Configuration file generation

pub mod config;
pub mod validate;

// Re-export command functions
pub use config::command_config;
pub use validate::command_validate;
