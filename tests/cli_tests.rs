//! Integration tests for the command-line surface.
//!
//! These run the compiled binary and check exit status and output for
//! configuration validation, the `validate` and `config` subcommands and
//! startup refusal.

use std::fs;
use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

/// Helper to get the binary path
fn binary_path() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_meow-config"))
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .env_remove("REDIS_URL")
        .output()
        .expect("Failed to execute command")
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_check_config_defaults_valid() {
    let output = run(&["--no-config", "--check-config"]);
    assert!(output.status.success(), "{}", combined(&output));
    assert!(combined(&output).contains("Configuration is valid"));
}

#[test]
fn test_tls_enabled_without_paths() {
    let output = run(&["--no-config", "--enable-tls", "--check-config"]);
    assert!(!output.status.success());
    assert!(
        combined(&output).contains("TLS is enabled but neither tls_cert_path nor tls_key_path are set"),
        "Expected error about missing TLS paths, got: '{}'",
        combined(&output)
    );
}

#[test]
fn test_tls_enabled_with_cert_only() {
    let output = run(&[
        "--no-config",
        "--enable-tls",
        "--tls-cert",
        "/some/path.pem",
        "--check-config",
    ]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("TLS is enabled but tls_key_path is not set"));
}

#[test]
fn test_tls_missing_cert_file() {
    let key = NamedTempFile::new().unwrap();
    let output = run(&[
        "--no-config",
        "--enable-tls",
        "--tls-cert",
        "/nonexistent/cert.pem",
        "--tls-key",
        key.path().to_str().unwrap(),
        "--check-config",
    ]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("TLS certificate file not found"));
}

#[test]
fn test_config_file_is_read() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "port: 0").unwrap();

    let output = run(&["-c", file.path().to_str().unwrap(), "--check-config"]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("port must be greater than 0"));
}

#[test]
fn test_show_config_json() {
    let output = run(&[
        "--no-config",
        "--port",
        "9100",
        "--show-config",
        "--config-format",
        "json",
    ]);
    assert!(output.status.success(), "{}", combined(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["port"], 9100);
    assert_eq!(value["file"], "config.csv");
}

#[test]
fn test_config_command_to_stdout() {
    let output = run(&["config", "-o", "-", "--format", "json"]);
    assert!(output.status.success(), "{}", combined(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["port"], 8000);
    assert_eq!(value["redis_url"], "localhost:6380");
}

#[test]
fn test_validate_good_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "web,http://web.example.com/,GET,200,1m30s,3").unwrap();
    writeln!(file, "api,http://api.example.com/,HEAD,204,30s,1").unwrap();

    let output = run(&["validate", "--file", file.path().to_str().unwrap()]);
    assert!(output.status.success(), "{}", combined(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 endpoint(s) valid"));
    assert!(stdout.contains("1m30s"));
}

#[test]
fn test_validate_bad_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "web,http://web.example.com/,GET,200,1m30s,3").unwrap();
    writeln!(file, "Bad_Id,http://web.example.com/,GET,200,1m30s,3").unwrap();

    let output = run(&["validate", "--file", file.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));
}

#[test]
fn test_validate_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");

    let output = run(&["validate", "--file", path.to_str().unwrap()]);
    assert!(output.status.success(), "{}", combined(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("does not exist"));
}

#[test]
fn test_startup_refused_without_liveness_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.csv");

    let output = run(&[
        "--no-config",
        "--addr",
        "127.0.0.1",
        "--port",
        "18977",
        "--file",
        path.to_str().unwrap(),
        "--redis-url",
        "127.0.0.1:1",
        "--liveness-timeout-ms",
        "500",
        "--log-level",
        "off",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Could not connect to Redis"));
    assert!(!path.exists());
}

#[test]
fn test_startup_refused_with_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.csv");
    fs::write(&path, "only,three,fields\n").unwrap();

    // Liveness is checked first, so point it at a listener that answers PONG
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let redis_addr = listener.local_addr().unwrap().to_string();
    let responder = std::thread::spawn(move || {
        use std::io::Read;
        if let Ok((mut socket, _)) = listener.accept() {
            let mut buf = [0u8; 64];
            let _ = socket.read(&mut buf);
            let _ = socket.write_all(b"+PONG\r\n");
        }
    });

    let output = run(&[
        "--no-config",
        "--addr",
        "127.0.0.1",
        "--port",
        "18978",
        "--file",
        path.to_str().unwrap(),
        "--redis-url",
        &redis_addr,
        "--log-level",
        "off",
    ]);
    responder.join().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed"), "{}", stderr);
    assert!(stderr.contains("line 1"), "{}", stderr);
}
