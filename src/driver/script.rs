//! Line-oriented script runner.

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use tracing::debug;

use super::report::{CommandOutput, DriverReport};
use crate::bridge::{ShellBridge, DEFAULT_OUTPUT_TIMEOUT};
use crate::error::ShellBridgeError;
use crate::Result;

/// Extract commands from script text.
///
/// One command per line. Blank lines and lines starting with `#` are skipped;
/// a trailing `\r` is removed.
pub fn parse_script(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<String> {
    let line = line.trim_end_matches('\r');
    let trimmed = line.trim_start();
    if trimmed.trim_end().is_empty() || trimmed.starts_with('#') {
        None
    } else {
        Some(line.to_string())
    }
}

/// Sends commands one at a time and collects their output.
///
/// After each command, lines are read with an idle timeout until the shell
/// goes quiet. Every line is passed to [`ShellBridge::log_output`] and, if
/// configured, copied to an echo writer.
pub struct ScriptDriver {
    bridge: ShellBridge,
    line_timeout: Duration,
    echo: Option<Box<dyn Write + Send>>,
}

impl ScriptDriver {
    /// Create a driver using the bridge's default output timeout.
    ///
    /// Collection needs an idle window to know when a command is done, so a
    /// bridge with the timeout disabled falls back to
    /// [`DEFAULT_OUTPUT_TIMEOUT`].
    pub fn new(bridge: ShellBridge) -> Self {
        let line_timeout = bridge.output_timeout().unwrap_or(DEFAULT_OUTPUT_TIMEOUT);
        Self {
            bridge,
            line_timeout,
            echo: None,
        }
    }

    /// Set the idle timeout used when collecting output.
    pub fn line_timeout(mut self, timeout: Duration) -> Self {
        self.line_timeout = timeout;
        self
    }

    /// Copy all collected output to `writer`.
    pub fn echo_to(mut self, writer: impl Write + Send + 'static) -> Self {
        self.echo = Some(Box::new(writer));
        self
    }

    /// Run every command read from `script`.
    ///
    /// Lines are read lazily, so an interactive reader such as stdin is
    /// driven as the user types.
    pub fn run_script<R: BufRead>(&mut self, script: R) -> Result<DriverReport> {
        let mut report = DriverReport {
            preamble: self.collect()?,
            ..Default::default()
        };

        for line in script.lines() {
            if let Some(command) = parse_line(&line?) {
                report.commands.push(self.run_one(&command)?);
            }
        }
        Ok(report)
    }

    /// Run the given commands in order.
    pub fn run_commands<I, S>(&mut self, commands: I) -> Result<DriverReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = DriverReport {
            preamble: self.collect()?,
            ..Default::default()
        };

        for command in commands {
            report.commands.push(self.run_one(command.as_ref())?);
        }
        Ok(report)
    }

    fn run_one(&mut self, command: &str) -> Result<CommandOutput> {
        let start = Instant::now();
        self.bridge
            .try_send_command(&format!("{}\n", command))
            .map_err(|e| ShellBridgeError::CommandRejected(format!("{}: {}", command, e)))?;
        debug!(command, "command sent");

        let lines = self.collect()?;
        Ok(CommandOutput {
            command: command.to_string(),
            lines,
            duration: start.elapsed(),
        })
    }

    fn collect(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.bridge.read_line_idle(Some(self.line_timeout)) {
            self.bridge.log_output(line.trim_end_matches(['\r', '\n']));
            if let Some(echo) = self.echo.as_mut() {
                echo.write_all(line.as_bytes())?;
                echo.flush()?;
            }
            lines.push(line);
        }
        Ok(lines)
    }
}
