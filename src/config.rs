//! Configuration management for shell-bridge.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bridge::{BridgeConfig, Encoding};
use crate::cli::Args;
use crate::pty::{PtyOptions, PtySize};
use crate::session::{SessionOptions, DEFAULT_CLOSE_GRACE};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bridge configuration.
    pub bridge: BridgeSection,
    /// Shell configuration.
    pub shell: ShellSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Bridge configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    /// Default idle timeout in milliseconds. Negative disables it.
    pub output_timeout_ms: i64,
    /// Character encoding of the session.
    pub encoding: Encoding,
    /// Grace period for stopping the transport, in milliseconds.
    pub close_grace_ms: u64,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            output_timeout_ms: 2000,
            encoding: Encoding::Utf8,
            close_grace_ms: DEFAULT_CLOSE_GRACE.as_millis() as u64,
        }
    }
}

/// Shell configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Shell program. Defaults to `$SHELL` or `/bin/sh`.
    pub program: Option<String>,
    /// `TERM` value exported to the shell.
    pub term: Option<String>,
    /// Terminal rows.
    pub rows: u16,
    /// Terminal columns.
    pub cols: u16,
    /// Terminal width in pixels.
    pub pixel_width: u16,
    /// Terminal height in pixels.
    pub pixel_height: u16,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            program: None,
            term: Some("dumb".to_string()),
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Convert a millisecond setting to a timeout; negative means none.
pub fn timeout_from_ms(ms: i64) -> Option<Duration> {
    u64::try_from(ms).ok().map(Duration::from_millis)
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(shell) = std::env::var("SHELL_BRIDGE_SHELL") {
            if !shell.is_empty() {
                self.shell.program = Some(shell);
            }
        }

        if let Ok(timeout) = std::env::var("SHELL_BRIDGE_TIMEOUT_MS") {
            self.bridge.output_timeout_ms = timeout
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHELL_BRIDGE_TIMEOUT_MS", timeout))?;
        }

        if let Ok(level) = std::env::var("SHELL_BRIDGE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref shell) = args.shell {
            self.shell.program = Some(shell.clone());
        }

        if let Some(timeout) = args.timeout_ms {
            self.bridge.output_timeout_ms = timeout;
        }

        if let Some(encoding) = args.encoding {
            self.bridge.encoding = encoding;
        }

        if let Some(ref term) = args.term {
            self.shell.term = Some(term.clone());
        }

        if let Some(rows) = args.rows {
            self.shell.rows = rows;
        }

        if let Some(cols) = args.cols {
            self.shell.cols = cols;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env()?;
        config.apply_args(args);

        Ok(config)
    }

    /// Default idle timeout for the bridge.
    pub fn output_timeout(&self) -> Option<Duration> {
        timeout_from_ms(self.bridge.output_timeout_ms)
    }

    /// Convert to the options used to open a shell session.
    pub fn to_session_options(&self) -> Result<SessionOptions, ConfigError> {
        if self.shell.rows == 0 {
            return Err(ConfigError::InvalidValue("rows", "0".to_string()));
        }
        if self.shell.cols == 0 {
            return Err(ConfigError::InvalidValue("cols", "0".to_string()));
        }

        let size = PtySize::new(self.shell.rows, self.shell.cols)
            .with_pixels(self.shell.pixel_width, self.shell.pixel_height);

        Ok(SessionOptions {
            pty: PtyOptions {
                shell: self.shell.program.clone(),
                term: self.shell.term.clone(),
                size,
            },
            bridge: BridgeConfig {
                output_timeout: self.output_timeout(),
                encoding: self.bridge.encoding,
            },
            close_grace: Duration::from_millis(self.bridge.close_grace_ms),
        })
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid setting value.
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidValue(name, value) => write!(f, "invalid value for {}: '{}'", name, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::ShellBridgeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bridge.output_timeout_ms, 2000);
        assert_eq!(config.bridge.encoding, Encoding::Utf8);
        assert_eq!(config.shell.rows, 24);
        assert_eq!(config.shell.cols, 80);
        assert_eq!(config.output_timeout(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn test_timeout_from_ms() {
        assert_eq!(timeout_from_ms(0), Some(Duration::ZERO));
        assert_eq!(timeout_from_ms(150), Some(Duration::from_millis(150)));
        assert_eq!(timeout_from_ms(-1), None);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "bridge": {
                "output_timeout_ms": -1,
                "encoding": "latin1"
            },
            "shell": {
                "program": "/bin/bash",
                "rows": 50,
                "cols": 132
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.output_timeout(), None);
        assert_eq!(config.bridge.encoding, Encoding::Latin1);
        assert_eq!(config.shell.program.as_deref(), Some("/bin/bash"));
        assert_eq!(config.shell.rows, 50);
        assert_eq!(config.shell.cols, 132);
        assert_eq!(config.shell.term.as_deref(), Some("dumb")); // Default
    }

    #[test]
    fn test_config_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            shell: Some("/bin/zsh".to_string()),
            timeout_ms: Some(500),
            encoding: Some(Encoding::Ascii),
            rows: Some(30),
            log_level: Some("debug".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.shell.program.as_deref(), Some("/bin/zsh"));
        assert_eq!(config.bridge.output_timeout_ms, 500);
        assert_eq!(config.bridge.encoding, Encoding::Ascii);
        assert_eq!(config.shell.rows, 30);
        assert_eq!(config.shell.cols, 80);
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_to_session_options() {
        let mut config = Config::default();
        config.bridge.output_timeout_ms = -5;
        config.shell.pixel_width = 800;

        let options = config.to_session_options().unwrap();
        assert_eq!(options.bridge.output_timeout, None);
        assert_eq!(options.pty.size.rows, 24);
        assert_eq!(options.pty.size.pixel_width, 800);
        assert_eq!(options.close_grace, DEFAULT_CLOSE_GRACE);
    }

    #[test]
    fn test_zero_geometry_rejected() {
        let mut config = Config::default();
        config.shell.cols = 0;
        assert!(config.to_session_options().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"output_timeout_ms\""));
        assert!(json.contains("\"utf8\""));
    }
}
