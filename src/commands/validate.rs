//! Validate command implementation.
//!
//! Loads the endpoint CSV file with the same rules as startup and prints
//! the records it contains.

use meow_config::duration::format_duration;
use meow_config::CsvFile;
use std::path::Path;

/// Validates an endpoint CSV file.
pub fn command_validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating endpoint file {}", path.display());

    if !path.exists() {
        println!("ℹ️  File does not exist - the service would start with an empty store");
        return Ok(());
    }

    let endpoints = match CsvFile::new(path).load() {
        Ok(endpoints) => endpoints,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let mut sorted: Vec<_> = endpoints.values().collect();
    sorted.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    println!(
        "{:24} {:8} {:>6} {:>10} {:>5}  url",
        "identifier", "method", "status", "frequency", "fail"
    );
    for endpoint in &sorted {
        println!(
            "{:24} {:8} {:>6} {:>10} {:>5}  {}",
            endpoint.identifier,
            endpoint.method,
            endpoint.status_online,
            format_duration(endpoint.frequency),
            endpoint.fail_after,
            endpoint.url
        );
    }

    println!("\n✅ {} endpoint(s) valid", sorted.len());
    Ok(())
}
