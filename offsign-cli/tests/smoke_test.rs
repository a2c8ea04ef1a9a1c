//! Smoke tests for the offsign binary
//!
//! These tests run the built binary without a node; nothing here needs
//! network access.

use std::process::{Command, Output};

fn offsign(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_offsign"))
        .args(args)
        .env_remove("OFFSIGN_PRIVATE_KEY")
        .env_remove("OFFSIGN_PUBLIC_KEY")
        .env_remove("OFFSIGN_PEER_ID")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute offsign")
}

/// Test that the CLI can show help
#[test]
fn test_cli_help() {
    let output = offsign(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for command in ["keygen", "upload", "status", "sign-batch", "sign"] {
        assert!(stdout.contains(command), "help should mention '{}'", command);
    }
}

/// Test that version is shown
#[test]
fn test_cli_version() {
    let output = offsign(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("offsign"));
}

#[test]
fn test_keygen_prints_a_usable_key() {
    let output = offsign(&["keygen"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let export = stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("export OFFSIGN_PRIVATE_KEY="))
        .expect("keygen should print an export line");
    assert_eq!(export.len(), 64);
    assert!(export.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_whoami_without_key() {
    let output = offsign(&["whoami"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No private key configured"));
}

#[test]
fn test_unreachable_node_fails() {
    let output = offsign(&["--api-url", "http://127.0.0.1:1", "status", "sid"]);
    assert!(!output.status.success());
}

#[test]
fn test_sign_requires_uts() {
    let output = offsign(&["sign", "sid", "Qm123"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--uts"));
}
