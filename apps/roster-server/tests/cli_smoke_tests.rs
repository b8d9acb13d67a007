#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the roster-server binary.

use std::process::{Command, Stdio};
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;

const DEPLOYMENT_VARS: &[&str] = &["DB_HOST", "DB_PORT", "DB_NAME", "DB_USER", "DB_PASSWORD", "PORT"];

fn command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_roster-server"));
    for var in DEPLOYMENT_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Run the binary with the given arguments and wait for it to exit.
fn run_roster_server(args: &[&str]) -> std::process::Output {
    command()
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute roster-server")
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

async fn http_get(port: u16, path: &str) -> std::io::Result<String> {
    let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;
    let mut response = String::new();
    stream.read_to_string(&mut response).await?;
    Ok(response)
}

#[test]
fn test_cli_help_command() {
    let output = run_roster_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("roster-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_roster_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("roster-server"), "Should contain binary name");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "Should contain the package version"
    );
}

#[test]
fn test_cli_invalid_command() {
    let output = run_roster_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error"),
        "Should contain error message about invalid command: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_roster_server(&["--config", "/nonexistent/roster.yaml", "check"]);

    assert!(
        !output.status.success(),
        "Should fail when config file doesn't exist"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config file does not exist"),
        "Should indicate config file not found: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_roster_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to load configuration"),
        "Should mention configuration loading: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("roster.yaml");
    std::fs::write(
        &config_path,
        r"
server:
  port: 8087
database:
  host: db.internal
  password: hunter2
logging:
  level: warn
",
    )
    .expect("Failed to write file");

    let output = run_roster_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(
        output.status.success(),
        "Valid config should pass: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("8087"));
    assert!(stdout.contains("db.internal"));
    assert!(!stdout.contains("hunter2"), "Password must be redacted");
}

#[test]
fn test_cli_print_config_applies_overrides() {
    let output = command()
        .args(["--port", "9123", "--mock", "-vv", "--print-config"])
        .env("DB_PASSWORD", "s3cret")
        .output()
        .expect("Failed to execute roster-server");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Effective configuration"));
    assert!(stdout.contains("9123"));
    assert!(stdout.contains("sqlite::memory:"));
    assert!(stdout.contains("\"debug\""));
    assert!(!stdout.contains("s3cret"));
}

#[test]
fn test_cli_deployment_env_is_applied() {
    let output = command()
        .args(["check"])
        .env("DB_HOST", "pg.cluster.local")
        .env("PORT", "6001")
        .output()
        .expect("Failed to execute roster-server");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pg.cluster.local"));
    assert!(stdout.contains("6001"));
}

#[tokio::test]
async fn test_cli_mock_server_answers_health() {
    let port = free_port();
    let port_arg = port.to_string();

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_roster-server"))
        .args(["--mock", "--port", &port_arg, "run"])
        .env("ROSTER__SERVER__HOST", "127.0.0.1")
        .env_remove("PORT")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn roster-server");

    let response = timeout(Duration::from_secs(15), async {
        loop {
            if let Ok(response) = http_get(port, "/health").await
                && response.starts_with("HTTP/1.1 200")
            {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await
    .expect("server should become ready");

    assert!(response.contains(r#"{"status":"ok"}"#), "{response}");
    assert!(response.to_ascii_lowercase().contains("x-request-id"));

    let students = http_get(port, "/api/students").await.unwrap();
    assert!(students.starts_with("HTTP/1.1 200"), "{students}");
    assert!(students.ends_with("[]"), "{students}");

    child.kill().await.unwrap();
}
