//! Session management: one bridge per spawned shell.

mod shell;

pub use shell::{SessionOptions, SessionSummary, ShellSession, DEFAULT_CLOSE_GRACE};
