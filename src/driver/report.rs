//! Driver result types.

use std::time::Duration;

/// Output collected for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// The command as written in the script, without trailing newline.
    pub command: String,
    /// Lines read back, each as returned by the bridge (newline included
    /// unless the line was cut by the idle timeout).
    pub lines: Vec<String>,
    /// Time from submission until output went idle.
    pub duration: Duration,
}

impl CommandOutput {
    /// Create an empty output record for a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// All output joined back into one string.
    pub fn text(&self) -> String {
        self.lines.concat()
    }

    /// The last line, typically the shell prompt.
    pub fn last_line(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Check whether the output ends with the given prompt.
    pub fn ends_with_prompt(&self, prompt: &str) -> bool {
        self.last_line().is_some_and(|l| l.ends_with(prompt))
    }
}

/// Everything a driver run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverReport {
    /// Output present before the first command (banner, first prompt).
    pub preamble: Vec<String>,
    /// Per-command output, in script order.
    pub commands: Vec<CommandOutput>,
}

impl DriverReport {
    /// Number of commands sent.
    pub fn commands_sent(&self) -> usize {
        self.commands.len()
    }

    /// Number of lines read, preamble included.
    pub fn lines_read(&self) -> usize {
        self.preamble.len() + self.commands.iter().map(|c| c.lines.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_text() {
        let output = CommandOutput {
            command: "ls".to_string(),
            lines: vec!["a.txt\n".to_string(), "b.txt\n".to_string(), "$ ".to_string()],
            duration: Duration::from_millis(10),
        };
        assert_eq!(output.text(), "a.txt\nb.txt\n$ ");
        assert_eq!(output.last_line(), Some("$ "));
        assert!(output.ends_with_prompt("$ "));
        assert!(!output.ends_with_prompt("# "));
    }

    #[test]
    fn test_empty_command_output() {
        let output = CommandOutput::new("true");
        assert_eq!(output.command, "true");
        assert!(output.last_line().is_none());
        assert!(!output.ends_with_prompt("$ "));
    }

    #[test]
    fn test_report_counts() {
        let report = DriverReport {
            preamble: vec!["$ ".to_string()],
            commands: vec![
                CommandOutput {
                    lines: vec!["x\n".to_string(), "$ ".to_string()],
                    ..CommandOutput::new("echo x")
                },
                CommandOutput::new("true"),
            ],
        };
        assert_eq!(report.commands_sent(), 2);
        assert_eq!(report.lines_read(), 3);
    }
}
