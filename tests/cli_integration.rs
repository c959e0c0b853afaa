//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

use shell_bridge::cli::{parse_args_from, Args};
use shell_bridge::config::Config;
use shell_bridge::Encoding;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("shell-bridge")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.shell.is_none());
    assert!(result.timeout_ms.is_none());
    assert!(result.encoding.is_none());
    assert!(result.config.is_none());
    assert!(result.script.is_none());
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-s",
        "/bin/bash",
        "-t",
        "750",
        "-e",
        "ascii",
        "--term",
        "xterm",
        "--rows",
        "50",
        "--cols",
        "200",
        "-l",
        "debug",
        "deploy.txt",
    ]))
    .unwrap();

    assert_eq!(result.shell.as_deref(), Some("/bin/bash"));
    assert_eq!(result.timeout_ms, Some(750));
    assert_eq!(result.encoding, Some(Encoding::Ascii));
    assert_eq!(result.term.as_deref(), Some("xterm"));
    assert_eq!(result.rows, Some(50));
    assert_eq!(result.cols, Some(200));
    assert_eq!(result.log_level.as_deref(), Some("debug"));
    assert_eq!(result.script.unwrap().to_str().unwrap(), "deploy.txt");
}

#[test]
fn test_cli_config_file() {
    let result = parse_args_from(args(&["-c", "/etc/shell-bridge.json"])).unwrap();

    assert_eq!(
        result.config.unwrap().to_str().unwrap(),
        "/etc/shell-bridge.json"
    );
}

#[test]
fn test_cli_invalid_timeout() {
    let result = parse_args_from(args(&["-t", "forever"]));
    assert!(result.is_err());
}

#[test]
fn test_cli_missing_value() {
    let result = parse_args_from(args(&["--shell"]));
    assert!(result.is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let json = r#"{
        "bridge": {
            "output_timeout_ms": 1500,
            "encoding": "latin1",
            "close_grace_ms": 250
        },
        "shell": {
            "program": "/bin/sh",
            "term": "vt100",
            "rows": 30,
            "cols": 100,
            "pixel_width": 640,
            "pixel_height": 480
        },
        "logging": {
            "level": "debug"
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.output_timeout(), Some(Duration::from_millis(1500)));
    assert_eq!(config.bridge.encoding, Encoding::Latin1);
    assert_eq!(config.shell.program.as_deref(), Some("/bin/sh"));
    assert_eq!(config.shell.term.as_deref(), Some("vt100"));
    assert_eq!(config.logging.level, "debug");

    let options = config.to_session_options().unwrap();
    assert_eq!(options.pty.size.rows, 30);
    assert_eq!(options.pty.size.cols, 100);
    assert_eq!(options.pty.size.pixel_height, 480);
    assert_eq!(options.close_grace, Duration::from_millis(250));
}

#[test]
fn test_config_priority_cli_over_file() {
    let json = r#"{
        "bridge": { "output_timeout_ms": 9000 },
        "shell": { "program": "/bin/ksh", "rows": 10 }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let args = Args {
        shell: Some("/bin/sh".to_string()),
        timeout_ms: Some(-1),
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();

    // CLI values should win
    assert_eq!(config.shell.program.as_deref(), Some("/bin/sh"));
    assert_eq!(config.output_timeout(), None);
    // Untouched file values survive
    assert_eq!(config.shell.rows, 10);
}

#[test]
fn test_config_missing_file() {
    let args = Args {
        config: Some("/nonexistent/shell-bridge.json".into()),
        ..Args::default()
    };

    assert!(Config::load(&args).is_err());
}

// ============================================================================
// Configuration Serialization Tests
// ============================================================================

#[test]
fn test_config_roundtrip() {
    let original = Config::default();
    let json = serde_json::to_string(&original).unwrap();
    let loaded: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(original, loaded);
}

#[test]
fn test_config_partial_deserialization() {
    let json = r#"{"shell": {"cols": 132}}"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.shell.cols, 132);
    assert_eq!(config.shell.rows, 24); // Default
    assert_eq!(config.bridge.output_timeout_ms, 2000); // Default
}
