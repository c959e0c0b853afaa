//! Native PTY implementation using portable-pty.

use portable_pty::{native_pty_system, CommandBuilder};
use std::io::{Read, Write};

use super::PtyOptions;
use crate::error::ShellBridgeError;
use crate::Result;

/// Get the default shell for the current platform.
pub fn default_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
    #[cfg(windows)]
    {
        "powershell.exe".to_string()
    }
}

/// Wrapper around the native PTY system.
pub struct NativePty {
    pty_system: Box<dyn portable_pty::PtySystem + Send>,
}

impl NativePty {
    /// Create a new NativePty instance.
    pub fn new() -> Self {
        Self {
            pty_system: native_pty_system(),
        }
    }

    /// Spawn a shell in a new PTY.
    pub fn spawn(&self, options: &PtyOptions) -> Result<SpawnedShell> {
        let pair = self
            .pty_system
            .openpty(options.size.into())
            .map_err(|e| ShellBridgeError::Pty(e.to_string()))?;

        let shell = options.shell.clone().unwrap_or_else(default_shell);
        let mut cmd = CommandBuilder::new(&shell);
        if let Some(term) = &options.term {
            cmd.env("TERM", term);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| ShellBridgeError::Pty(e.to_string()))?;
        // Release our slave handle so reads see EOF/EIO once the child exits.
        drop(pair.slave);

        let pid = child.process_id().unwrap_or(0);
        tracing::debug!(shell = %shell, pid, "shell spawned");

        Ok(SpawnedShell {
            master: pair.master,
            child,
            pid,
        })
    }
}

impl Default for NativePty {
    fn default() -> Self {
        Self::new()
    }
}

/// A spawned shell process with its PTY.
pub struct SpawnedShell {
    master: Box<dyn portable_pty::MasterPty + Send>,
    child: Box<dyn portable_pty::Child + Send + Sync>,
    pid: u32,
}

impl SpawnedShell {
    /// Process ID of the shell, 0 if unknown.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Take the writer (can only be called once).
    pub fn take_writer(&mut self) -> Result<Box<dyn Write + Send>> {
        self.master
            .take_writer()
            .map_err(|e| ShellBridgeError::Pty(e.to_string()))
    }

    /// Clone a reader for the PTY output.
    pub fn take_reader(&mut self) -> Result<Box<dyn Read + Send>> {
        self.master
            .try_clone_reader()
            .map_err(|e| ShellBridgeError::Pty(e.to_string()))
    }

    /// Try to wait for the child process without blocking.
    pub fn try_wait(&mut self) -> std::io::Result<Option<portable_pty::ExitStatus>> {
        self.child.try_wait()
    }

    /// Kill the child process.
    pub fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill()
    }

    /// Wait for the child process to exit.
    pub fn wait(&mut self) -> std::io::Result<portable_pty::ExitStatus> {
        self.child.wait()
    }
}
