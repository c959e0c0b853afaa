//! Slot for the single command awaiting transmission.

/// A command being drained by the source, byte by byte.
#[derive(Debug)]
pub struct PendingCommand {
    seq: u64,
    bytes: Vec<u8>,
    cursor: usize,
}

impl PendingCommand {
    fn new(seq: u64, bytes: Vec<u8>) -> Self {
        Self {
            seq,
            bytes,
            cursor: 0,
        }
    }

    /// Sequence number assigned at installation.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Bytes not yet handed to the transport.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// Take the next byte, if any is left.
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.bytes.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(byte)
    }

    /// Copy as many remaining bytes as fit into `buf`.
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let n = self.remaining().min(buf.len());
        buf[..n].copy_from_slice(&self.bytes[self.cursor..self.cursor + n]);
        self.cursor += n;
        n
    }
}

/// Holds at most one [`PendingCommand`].
///
/// The slot is "sent" when empty: a command leaves the slot as soon as the
/// source has reported its boundary.
#[derive(Debug, Default)]
pub struct PendingSlot {
    command: Option<PendingCommand>,
    installed: u64,
}

impl PendingSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the previous command has been fully drained.
    pub fn is_sent(&self) -> bool {
        self.command.is_none()
    }

    /// Install a new command. Returns its sequence number.
    ///
    /// The caller must ensure the slot [`is_sent`](Self::is_sent).
    pub fn install(&mut self, bytes: Vec<u8>) -> u64 {
        debug_assert!(self.is_sent(), "previous command not drained");
        self.installed += 1;
        self.command = Some(PendingCommand::new(self.installed, bytes));
        self.installed
    }

    /// The command currently draining.
    pub fn current_mut(&mut self) -> Option<&mut PendingCommand> {
        self.command.as_mut()
    }

    /// Drop the drained command, marking the slot sent.
    pub fn finish(&mut self) -> Option<u64> {
        self.command.take().map(|c| c.seq)
    }

    /// Total number of commands installed so far.
    pub fn installed_count(&self) -> u64 {
        self.installed
    }
}
