//! Write endpoint handed to the transport.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use tracing::trace;

use super::Shared;

/// Appends remote output to the bridge buffer.
///
/// Every append stamps the bridge's last-update time and wakes blocked
/// readers. Appends never fail, including after the bridge is closed.
#[derive(Clone)]
pub struct BridgeSink {
    shared: Arc<Shared>,
}

impl BridgeSink {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Append a single byte.
    pub fn push(&self, byte: u8) {
        let mut state = self.shared.lock();
        state.output.push(byte);
        state.last_update = Some(Instant::now());
        drop(state);
        self.shared.notify();
    }

    /// Append a chunk of output under one lock acquisition.
    pub fn append(&self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let mut state = self.shared.lock();
        state.output.extend(data);
        state.last_update = Some(Instant::now());
        drop(state);
        self.shared.notify();
        trace!(len = data.len(), "output appended");
    }

    /// Close the bridge from the transport side once the remote end is gone.
    ///
    /// Buffered output stays readable.
    pub fn close(&self) {
        self.shared.close();
    }
}

impl Write for BridgeSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
