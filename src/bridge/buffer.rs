//! Output buffer holding remote shell output until the driver consumes it.

use std::collections::VecDeque;

/// Ordered byte sequence, appended at the tail and consumed from the head.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: VecDeque<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes at the tail.
    pub fn extend(&mut self, data: &[u8]) {
        self.bytes.extend(data.iter().copied());
    }

    /// Append one byte at the tail.
    pub fn push(&mut self, byte: u8) {
        self.bytes.push_back(byte);
    }

    /// Remove and return the head byte.
    pub fn pop_front(&mut self) -> Option<u8> {
        self.bytes.pop_front()
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the first complete line, newline included.
    pub fn line_len(&self) -> Option<usize> {
        self.bytes.iter().position(|&b| b == b'\n').map(|i| i + 1)
    }

    /// Remove and return the first `n` bytes (clamped to the buffer length).
    pub fn take(&mut self, n: usize) -> Vec<u8> {
        let n = n.min(self.bytes.len());
        self.bytes.drain(..n).collect()
    }

    /// Remove and return everything.
    pub fn take_all(&mut self) -> Vec<u8> {
        self.bytes.drain(..).collect()
    }

    /// Copy the whole buffer without consuming it.
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.line_len(), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut buf = OutputBuffer::new();
        buf.extend(b"ab");
        buf.push(b'c');

        assert_eq!(buf.pop_front(), Some(b'a'));
        assert_eq!(buf.pop_front(), Some(b'b'));
        assert_eq!(buf.pop_front(), Some(b'c'));
        assert_eq!(buf.pop_front(), None);
    }

    #[test]
    fn test_line_len_includes_newline() {
        let mut buf = OutputBuffer::new();
        buf.extend(b"foo\nbar\n");
        assert_eq!(buf.line_len(), Some(4));

        let line = buf.take(4);
        assert_eq!(line, b"foo\n");
        assert_eq!(buf.line_len(), Some(4));
    }

    #[test]
    fn test_snapshot_does_not_consume() {
        let mut buf = OutputBuffer::new();
        buf.extend(b"$ ");
        assert_eq!(buf.snapshot(), b"$ ");
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_take_clamps() {
        let mut buf = OutputBuffer::new();
        buf.extend(b"xy");
        assert_eq!(buf.take(10), b"xy");
        assert!(buf.is_empty());
        assert!(buf.take_all().is_empty());
    }
}
