//! # shell-bridge
//!
//! Drive an interactive, byte-oriented shell session one command at a time.
//!
//! A [`ShellBridge`] sits between a transport (which pumps raw bytes to and
//! from a remote shell) and a driver (which submits commands and reads the
//! output back). Output can be read character by character, line by line, or
//! as "whatever has accumulated" once the shell has gone quiet for a while.
//!
//! ## Features
//!
//! - **Explicit adapters**: [`BridgeSink`] and [`BridgeSource`] implement
//!   `std::io::Write` / `std::io::Read` for any transport
//! - **Command hand-off**: at most one command in flight, with an explicit
//!   [`SourceEvent::Boundary`] after each one
//! - **Idle-timeout reads**: partial lines are surfaced once output stops
//! - **Local PTY transport**: spawn a shell with portable-pty and drive it
//!
//! ## Quick Start
//!
//! ```no_run
//! use shell_bridge::{ScriptDriver, SessionOptions, ShellSession};
//!
//! #[tokio::main]
//! async fn main() -> shell_bridge::Result<()> {
//!     shell_bridge::logging::try_init().ok();
//!
//!     let session = ShellSession::open(SessionOptions::default())?;
//!     let report = session
//!         .run_driver(|bridge| ScriptDriver::new(bridge).run_commands(["uname -a"]))
//!         .await?;
//!     session.close().await;
//!
//!     print!("{}", report.commands[0].text());
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod pty;
pub mod session;

// Re-export commonly used types
pub use bridge::{BridgeConfig, BridgeSink, BridgeSource, Encoding, ShellBridge, SourceEvent};
pub use driver::{CommandOutput, DriverReport, ScriptDriver};
pub use error::{Result, ShellBridgeError};
pub use logging::{DiscardOutputLog, OutputLog, TracingOutputLog};
pub use pty::{NativePty, PtyOptions, PtySize};
pub use session::{SessionOptions, SessionSummary, ShellSession};
