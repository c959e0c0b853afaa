//! Command script driver.
//!
//! Runs a list of shell commands through a [`ShellBridge`](crate::ShellBridge)
//! one at a time, collecting each command's output with idle-timeout line
//! reads.
//!
//! # Example
//!
//! ```no_run
//! use shell_bridge::{ScriptDriver, ShellBridge};
//!
//! # fn run(bridge: ShellBridge) -> shell_bridge::Result<()> {
//! let script = "# list files\nls\n\npwd\n";
//! let report = ScriptDriver::new(bridge).run_script(script.as_bytes())?;
//! for output in &report.commands {
//!     println!("{} -> {} lines", output.command, output.lines.len());
//! }
//! # Ok(())
//! # }
//! ```

mod report;
mod script;

pub use report::{CommandOutput, DriverReport};
pub use script::{parse_script, ScriptDriver};
