//! A bridge wired to a locally spawned shell.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::bridge::{BridgeConfig, ShellBridge};
use crate::logging::OutputLog;
use crate::pty::{InputPump, NativePty, OutputPump, PtyOptions, SpawnedShell};
use crate::Result;

/// Default time to wait for the pumps to stop on close.
pub const DEFAULT_CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Configuration for opening a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// How to spawn the shell.
    pub pty: PtyOptions,
    /// Bridge settings.
    pub bridge: BridgeConfig,
    /// How long [`ShellSession::close`] waits for each pump.
    pub close_grace: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            pty: PtyOptions::default(),
            bridge: BridgeConfig::default(),
            close_grace: DEFAULT_CLOSE_GRACE,
        }
    }
}

/// Traffic counters reported when a session closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Output bytes delivered to the bridge.
    pub bytes_received: u64,
    /// Commands written to the shell.
    pub commands_written: u64,
}

/// One interactive shell session: a spawned shell, a bridge, and the two
/// pumps moving bytes between them.
pub struct ShellSession {
    bridge: ShellBridge,
    shell: SpawnedShell,
    output_task: JoinHandle<u64>,
    input_task: JoinHandle<u64>,
    close_grace: Duration,
}

impl ShellSession {
    /// Spawn a shell and start pumping.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(options: SessionOptions) -> Result<Self> {
        let bridge = ShellBridge::with_config(options.bridge);
        Self::open_with_bridge(options, bridge)
    }

    /// Like [`open`](Self::open), with `log` receiving
    /// [`ShellBridge::log_output`] calls.
    pub fn open_with_log(options: SessionOptions, log: Arc<dyn OutputLog>) -> Result<Self> {
        let bridge = ShellBridge::with_config(options.bridge).with_output_log(log);
        Self::open_with_bridge(options, bridge)
    }

    fn open_with_bridge(options: SessionOptions, bridge: ShellBridge) -> Result<Self> {
        let mut shell = NativePty::new().spawn(&options.pty)?;
        let reader = shell.take_reader()?;
        let writer = shell.take_writer()?;

        let output_task = tokio::spawn(OutputPump::new(reader, bridge.sink()).run());
        let input_task = tokio::spawn(InputPump::new(bridge.source(), writer).run());

        info!(pid = shell.pid(), "shell session opened");

        Ok(Self {
            bridge,
            shell,
            output_task,
            input_task,
            close_grace: options.close_grace,
        })
    }

    /// The session's bridge.
    pub fn bridge(&self) -> &ShellBridge {
        &self.bridge
    }

    /// Process ID of the shell.
    pub fn pid(&self) -> u32 {
        self.shell.pid()
    }

    /// Run a blocking driver against the bridge on the blocking thread pool.
    pub async fn run_driver<F, T>(&self, driver: F) -> Result<T>
    where
        F: FnOnce(ShellBridge) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let bridge = self.bridge.clone();
        let result = tokio::task::spawn_blocking(move || driver(bridge)).await?;
        if let Err(e) = &result {
            error!("driver failed: {}", e);
        }
        result
    }

    /// Close the bridge, stop the shell, and wait for the pumps.
    ///
    /// Teardown problems are logged, not returned.
    pub async fn close(mut self) -> SessionSummary {
        self.bridge.close();

        if let Err(e) = self.shell.kill() {
            debug!("kill failed (shell may have exited): {}", e);
        }

        let commands_written = Self::join("input", self.input_task, self.close_grace).await;
        let bytes_received = Self::join("output", self.output_task, self.close_grace).await;

        match self.shell.try_wait() {
            Ok(Some(status)) => debug!(?status, "shell exited"),
            Ok(None) => warn!(pid = self.shell.pid(), "shell still running after close"),
            Err(e) => warn!("failed to reap shell: {}", e),
        }

        let summary = SessionSummary {
            bytes_received,
            commands_written,
        };
        info!(
            bytes = summary.bytes_received,
            commands = summary.commands_written,
            "shell session closed"
        );
        summary
    }

    async fn join(name: &str, task: JoinHandle<u64>, grace: Duration) -> u64 {
        match tokio::time::timeout(grace, task).await {
            Ok(Ok(count)) => count,
            Ok(Err(e)) => {
                error!("{} pump failed: {}", name, e);
                0
            }
            Err(_) => {
                warn!("{} pump did not stop within {:?}", name, grace);
                0
            }
        }
    }
}

impl std::fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellSession")
            .field("pid", &self.shell.pid())
            .field("bridge", &self.bridge)
            .finish()
    }
}
