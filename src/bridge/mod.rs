//! Interactive shell bridge.
//!
//! A [`ShellBridge`] reconciles two independently paced byte streams: output
//! pushed by the transport through a [`BridgeSink`], and commands pulled by the
//! transport through a [`BridgeSource`]. The driver sits on the other side and
//! talks to the bridge through blocking primitives.
//!
//! All state lives behind one mutex. Every change (append, install, drain,
//! close) wakes all waiters on a single condition variable.
//!
//! # Example
//!
//! ```
//! use shell_bridge::{ShellBridge, SourceEvent};
//! use std::time::Duration;
//!
//! let bridge = ShellBridge::new();
//! let sink = bridge.sink();
//! let source = bridge.source();
//!
//! assert!(bridge.send_command("ls\n"));
//! assert_eq!(source.next_event(), SourceEvent::Byte(b'l'));
//! assert_eq!(source.next_event(), SourceEvent::Byte(b's'));
//! assert_eq!(source.next_event(), SourceEvent::Byte(b'\n'));
//! assert_eq!(source.next_event(), SourceEvent::Boundary);
//!
//! sink.append(b"foo.txt\n$ ");
//! assert_eq!(bridge.read_line_peek().as_deref(), Some("foo.txt\n"));
//! assert_eq!(bridge.read_line_peek().as_deref(), Some("$ "));
//! assert_eq!(
//!     bridge.read_line_idle(Some(Duration::from_millis(10))).as_deref(),
//!     Some("$ ")
//! );
//! ```

mod buffer;
mod encoding;
mod pending;
mod sink;
mod source;

pub use buffer::OutputBuffer;
pub use encoding::Encoding;
pub use pending::{PendingCommand, PendingSlot};
pub use sink::BridgeSink;
pub use source::{BridgeSource, SourceEvent};

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::error::ShellBridgeError;
use crate::logging::{OutputLog, TracingOutputLog};
use crate::Result;

/// Default idle timeout used by the timeout-less read variants.
pub const DEFAULT_OUTPUT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Bridge settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Default idle timeout. `None` waits indefinitely.
    pub output_timeout: Option<Duration>,
    /// Encoding of command text and line reads.
    pub encoding: Encoding,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            output_timeout: Some(DEFAULT_OUTPUT_TIMEOUT),
            encoding: Encoding::default(),
        }
    }
}

/// State guarded by the bridge lock.
#[derive(Debug)]
pub(crate) struct BridgeState {
    pub(crate) output: OutputBuffer,
    pub(crate) pending: PendingSlot,
    pub(crate) last_update: Option<Instant>,
    pub(crate) closed: bool,
    output_timeout: Option<Duration>,
}

/// Lock and condition variable shared by the bridge and its adapters.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<BridgeState>,
    changed: Condvar,
}

impl Shared {
    fn new(output_timeout: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(BridgeState {
                output: OutputBuffer::new(),
                pending: PendingSlot::new(),
                last_update: None,
                closed: false,
                output_timeout,
            }),
            changed: Condvar::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait<'a>(
        &self,
        guard: MutexGuard<'a, BridgeState>,
    ) -> MutexGuard<'a, BridgeState> {
        self.changed
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait_timeout<'a>(
        &self,
        guard: MutexGuard<'a, BridgeState>,
        timeout: Duration,
    ) -> MutexGuard<'a, BridgeState> {
        self.changed
            .wait_timeout(guard, timeout)
            .map(|(guard, _)| guard)
            .unwrap_or_else(|e| e.into_inner().0)
    }

    pub(crate) fn notify(&self) {
        self.changed.notify_all();
    }

    pub(crate) fn close(&self) {
        let mut state = self.lock();
        if !state.closed {
            state.closed = true;
            debug!(
                pending = !state.pending.is_sent(),
                buffered = state.output.len(),
                "bridge closed"
            );
        }
        drop(state);
        self.notify();
    }
}

/// Handle to one interactive shell bridge.
///
/// Clones share the same bridge.
#[derive(Clone)]
pub struct ShellBridge {
    shared: Arc<Shared>,
    encoding: Encoding,
    output_log: Arc<dyn OutputLog>,
}

impl ShellBridge {
    /// Create a bridge with default settings.
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    /// Create a bridge with the given settings.
    pub fn with_config(config: BridgeConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(config.output_timeout)),
            encoding: config.encoding,
            output_log: Arc::new(TracingOutputLog),
        }
    }

    /// Replace the sink used by [`log_output`](Self::log_output).
    pub fn with_output_log(mut self, log: Arc<dyn OutputLog>) -> Self {
        self.output_log = log;
        self
    }

    /// Write endpoint for the transport.
    pub fn sink(&self) -> BridgeSink {
        BridgeSink::new(Arc::clone(&self.shared))
    }

    /// Read endpoint for the transport.
    pub fn source(&self) -> BridgeSource {
        BridgeSource::new(Arc::clone(&self.shared))
    }

    /// Encoding used for commands and line reads.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Send a command to the shell.
    ///
    /// Blocks until the previous command has been fully drained by the source.
    /// Returns `false` if the text cannot be encoded or the bridge is closed;
    /// nothing is installed in that case.
    pub fn send_command(&self, text: &str) -> bool {
        match self.try_send_command(text) {
            Ok(()) => true,
            Err(e) => {
                warn!("command rejected: {}", e);
                false
            }
        }
    }

    /// Like [`send_command`](Self::send_command), but reports why a command was rejected.
    pub fn try_send_command(&self, text: &str) -> Result<()> {
        let bytes = self.encoding.encode(text)?;

        let mut state = self.shared.lock();
        while !state.pending.is_sent() && !state.closed {
            state = self.shared.wait(state);
        }
        if state.closed {
            return Err(ShellBridgeError::Closed);
        }

        let len = bytes.len();
        let seq = state.pending.install(bytes);
        drop(state);
        self.shared.notify();

        debug!(seq, len, "command installed");
        Ok(())
    }

    /// Pop one character from the buffer head.
    ///
    /// Waits up to `timeout` for output to arrive (`None` waits indefinitely).
    /// Each call consumes exactly one buffered byte, mapped to `char` as Latin-1.
    /// Returns `None` if nothing arrived in time.
    pub fn read_char(&self, timeout: Option<Duration>) -> Option<char> {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.shared.lock();
        loop {
            if let Some(byte) = state.output.pop_front() {
                return Some(char::from(byte));
            }
            state = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    self.shared.wait_timeout(state, deadline - now)
                }
                None => self.shared.wait(state),
            };
        }
    }

    /// [`read_char`](Self::read_char) with the default output timeout.
    pub fn read_char_default(&self) -> Option<char> {
        self.read_char(self.output_timeout())
    }

    /// Non-blocking line read.
    ///
    /// Returns and removes the first complete line if there is one. Otherwise
    /// returns a copy of whatever is buffered without removing it, so repeated
    /// calls see the partial line grow. Returns `None` on an empty buffer.
    pub fn read_line_peek(&self) -> Option<String> {
        let mut state = self.shared.lock();
        let bytes = match state.output.line_len() {
            Some(n) => state.output.take(n),
            None if state.output.is_empty() => return None,
            None => state.output.snapshot(),
        };
        drop(state);
        Some(self.encoding.decode(&bytes))
    }

    /// Line read with an idle timeout.
    ///
    /// Blocks until a complete line is buffered or no output has been appended
    /// for `timeout`. On a complete line, that line is removed and returned;
    /// after an idle expiry, any partial content is removed and returned. If the
    /// buffer is empty at expiry, returns `None` and resets the idle clock so the
    /// next call measures its window from its own start. `None` as timeout waits
    /// for a complete line indefinitely.
    pub fn read_line_idle(&self, timeout: Option<Duration>) -> Option<String> {
        let mut state = self.shared.lock();
        if state.last_update.is_none() {
            state.last_update = Some(Instant::now());
        }

        loop {
            if let Some(n) = state.output.line_len() {
                let bytes = state.output.take(n);
                drop(state);
                return Some(self.encoding.decode(&bytes));
            }

            let Some(timeout) = timeout else {
                state = self.shared.wait(state);
                continue;
            };

            let last_update = *state.last_update.get_or_insert_with(Instant::now);
            match last_update.checked_add(timeout) {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    state = self.shared.wait_timeout(state, deadline - now);
                }
                None => state = self.shared.wait(state),
            }
        }

        if !state.output.is_empty() {
            let bytes = state.output.take_all();
            drop(state);
            trace!(len = bytes.len(), "idle timeout, returning partial line");
            return Some(self.encoding.decode(&bytes));
        }

        state.last_update = None;
        None
    }

    /// [`read_line_idle`](Self::read_line_idle) with the default output timeout.
    pub fn read_line_idle_default(&self) -> Option<String> {
        self.read_line_idle(self.output_timeout())
    }

    /// Default timeout used by the `_default` read variants.
    pub fn output_timeout(&self) -> Option<Duration> {
        self.shared.lock().output_timeout
    }

    /// Set the default output timeout. `None` disables it.
    pub fn set_output_timeout(&self, timeout: Option<Duration>) {
        self.shared.lock().output_timeout = timeout;
    }

    /// Emit text through the injected output log.
    pub fn log_output(&self, text: &str) {
        self.output_log.log(text);
    }

    /// Close the bridge.
    ///
    /// The source yields end-of-stream from now on and pending or future
    /// submissions are rejected. Buffered output stays readable.
    pub fn close(&self) {
        self.shared.close();
    }

    /// Check whether the bridge has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Check whether the last command has been fully drained.
    pub fn is_command_sent(&self) -> bool {
        self.shared.lock().pending.is_sent()
    }

    /// Time of the most recent append, unless reset by an empty idle read.
    pub fn last_update(&self) -> Option<Instant> {
        self.shared.lock().last_update
    }

    /// Number of buffered output bytes.
    pub fn buffered_len(&self) -> usize {
        self.shared.lock().output.len()
    }
}

impl Default for ShellBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShellBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ShellBridge")
            .field("encoding", &self.encoding)
            .field("buffered", &state.output.len())
            .field("command_sent", &state.pending.is_sent())
            .field("closed", &state.closed)
            .finish()
    }
}
