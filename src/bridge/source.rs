//! Read endpoint handed to the transport.

use std::io::{self, Read};
use std::sync::Arc;

use tracing::{debug, trace};

use super::Shared;

/// What the transport gets when pulling from a [`BridgeSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    /// Next byte of the current command.
    Byte(u8),
    /// The current command ended. Produced once per command.
    Boundary,
    /// The bridge is closed. Every later pull returns this too.
    Closed,
}

/// Feeds submitted commands to the transport.
pub struct BridgeSource {
    shared: Arc<Shared>,
}

impl BridgeSource {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Pull the next event, blocking while there is no command to drain.
    pub fn next_event(&self) -> SourceEvent {
        let mut state = self.shared.lock();
        loop {
            if let Some(event) = Self::step(&mut state) {
                drop(state);
                if event == SourceEvent::Boundary {
                    self.shared.notify();
                }
                return event;
            }
            state = self.shared.wait(state);
        }
    }

    /// Pull the next event without blocking. `None` means idle.
    pub fn try_next_event(&self) -> Option<SourceEvent> {
        let mut state = self.shared.lock();
        let event = Self::step(&mut state);
        drop(state);
        if event == Some(SourceEvent::Boundary) {
            self.shared.notify();
        }
        event
    }

    fn step(state: &mut super::BridgeState) -> Option<SourceEvent> {
        if state.closed {
            return Some(SourceEvent::Closed);
        }
        let command = state.pending.current_mut()?;
        match command.next_byte() {
            Some(byte) => Some(SourceEvent::Byte(byte)),
            None => {
                if let Some(seq) = state.pending.finish() {
                    debug!(seq, "command drained");
                }
                Some(SourceEvent::Boundary)
            }
        }
    }

    /// Close the bridge this source belongs to.
    pub fn close(&self) {
        self.shared.close();
    }

    /// Check whether the bridge is closed.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

/// Streams command bytes, skipping boundaries.
///
/// Blocks while no command is pending and returns `Ok(0)` only once the
/// bridge is closed. A single read never spans two commands.
impl Read for BridgeSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut state = self.shared.lock();
        loop {
            if state.closed {
                return Ok(0);
            }
            if let Some(command) = state.pending.current_mut() {
                let n = command.read_into(buf);
                if command.remaining() == 0 {
                    if let Some(seq) = state.pending.finish() {
                        debug!(seq, "command drained");
                    }
                    drop(state);
                    self.shared.notify();
                    if n > 0 {
                        trace!(len = n, "command bytes read");
                        return Ok(n);
                    }
                    state = self.shared.lock();
                    continue;
                }
                trace!(len = n, "command bytes read");
                return Ok(n);
            }
            state = self.shared.wait(state);
        }
    }
}
