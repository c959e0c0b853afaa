//! Command-line interface for shell-bridge.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::bridge::Encoding;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Shell program to spawn.
    pub shell: Option<String>,
    /// Default idle timeout in milliseconds (negative disables it).
    pub timeout_ms: Option<i64>,
    /// Session encoding.
    pub encoding: Option<Encoding>,
    /// `TERM` value for the shell.
    pub term: Option<String>,
    /// Terminal rows.
    pub rows: Option<u16>,
    /// Terminal columns.
    pub cols: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Command script; stdin when absent.
    pub script: Option<PathBuf>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("timeout") => {
                let value: String = parser.value()?.parse()?;
                result.timeout_ms = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("timeout", value))?,
                );
            }
            Short('e') | Long("encoding") => {
                let value: String = parser.value()?.parse()?;
                result.encoding = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("encoding", value))?,
                );
            }
            Long("term") => {
                result.term = Some(parser.value()?.parse()?);
            }
            Long("rows") => {
                let value: String = parser.value()?.parse()?;
                result.rows = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("rows", value))?,
                );
            }
            Long("cols") => {
                let value: String = parser.value()?.parse()?;
                result.cols = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("cols", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) if result.script.is_none() => {
                result.script = Some(PathBuf::from(val));
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"shell-bridge {version}
Drive an interactive shell one command at a time

USAGE:
    shell-bridge [OPTIONS] [SCRIPT]

ARGS:
    <SCRIPT>                File with one command per line ('#' starts a comment).
                            Commands are read from stdin when omitted.

OPTIONS:
    -s, --shell <PATH>      Shell to spawn [default: $SHELL or /bin/sh]
    -t, --timeout <MS>      Idle timeout for output reads [default: 2000]
                            Negative disables it for the library bridge; the
                            script runner then uses the 2000 ms default
    -e, --encoding <ENC>    Session encoding: utf-8, latin1, ascii [default: utf-8]
        --term <TERM>       TERM value exported to the shell [default: dumb]
        --rows <N>          Terminal rows [default: 24]
        --cols <N>          Terminal columns [default: 80]
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    SHELL_BRIDGE_SHELL      Shell program (overrides config)
    SHELL_BRIDGE_TIMEOUT_MS Idle timeout (overrides config)
    SHELL_BRIDGE_LOG_LEVEL  Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Run a script against the default shell
    shell-bridge deploy.txt

    # Pipe commands through bash with a short idle timeout
    printf 'ls\npwd\n' | shell-bridge -s /bin/bash -t 500
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("shell-bridge {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
