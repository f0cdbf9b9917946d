//! CLI integration tests

use std::process::Command;

fn run_cli(args: &[&str]) -> std::process::Output {
    let mut full_args = vec!["run", "-p", "tsp-cli", "--"];
    full_args.extend_from_slice(args);
    Command::new("cargo")
        .args(&full_args)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Titanic Survival Predictor"),
        "Should show app name"
    );
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("traffic"), "Should show traffic command");
    assert!(stdout.contains("burst"), "Should show burst command");
    assert!(
        stdout.contains("inject-errors"),
        "Should show inject-errors command"
    );
    assert!(stdout.contains("metrics"), "Should show metrics command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = run_cli(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("tsp"), "Should show binary name");
}

/// Test global options appear in help
#[test]
fn test_global_options() {
    let output = run_cli(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("TSP_API_URL"), "Should show env var");
    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
}

/// Test traffic subcommand help
#[test]
fn test_traffic_help() {
    let output = run_cli(&["traffic", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Traffic help should succeed");
    assert!(stdout.contains("--duration"), "Should show duration option");
    assert!(
        stdout.contains("--min-pause-ms"),
        "Should show min-pause-ms option"
    );
    assert!(
        stdout.contains("--max-pause-ms"),
        "Should show max-pause-ms option"
    );
}

/// Test inject-errors subcommand help
#[test]
fn test_inject_errors_help() {
    let output = run_cli(&["inject-errors", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Inject-errors help should succeed");
    assert!(stdout.contains("--duration"), "Should show duration option");
    assert!(stdout.contains("--pause-ms"), "Should show pause-ms option");
}

/// Test metrics subcommand help
#[test]
fn test_metrics_help() {
    let output = run_cli(&["metrics", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Metrics help should succeed");
    assert!(stdout.contains("--filter"), "Should show filter option");
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let output = run_cli(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}
