//! Byte pumps between a PTY and a bridge.
//!
//! PTY reads and writes block, so both pumps run their loops in
//! `spawn_blocking` to keep the tokio runtime free. Faults are logged and end
//! the pump; they are never surfaced as errors. A pump that stops on its own
//! closes the bridge, so submitters and the other pump are not left waiting
//! on a dead shell.

use std::io::{Read, Write};

use tracing::{debug, error, trace};

use crate::bridge::{BridgeSink, BridgeSource, SourceEvent};

/// Copies PTY output into a bridge sink.
pub struct OutputPump<R: Read + Send + 'static> {
    reader: R,
    sink: BridgeSink,
    buffer_size: usize,
}

impl<R: Read + Send + 'static> OutputPump<R> {
    /// Create a new OutputPump.
    pub fn new(reader: R, sink: BridgeSink) -> Self {
        Self {
            reader,
            sink,
            buffer_size: 4096,
        }
    }

    /// Create with custom buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Run the pump until the PTY is closed.
    ///
    /// Returns the number of bytes delivered to the bridge. Stops on:
    /// - EOF (read returns 0)
    /// - EIO on Unix, which means the PTY slave was closed
    /// - any other read error
    ///
    /// The bridge is closed when the pump stops; output already delivered
    /// can still be read.
    pub async fn run(self) -> u64 {
        let buffer_size = self.buffer_size;
        let mut reader = self.reader;
        let sink = self.sink;

        let result = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; buffer_size];
            let mut total = 0u64;

            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        debug!("output pump: EOF");
                        break;
                    }
                    Ok(n) => {
                        trace!("output pump: read {} bytes", n);
                        sink.append(&buf[..n]);
                        total += n as u64;
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        #[cfg(unix)]
                        if e.raw_os_error() == Some(libc::EIO) {
                            debug!("output pump: PTY closed (EIO)");
                            break;
                        }

                        if e.kind() == std::io::ErrorKind::BrokenPipe {
                            debug!("output pump: broken pipe");
                            break;
                        }

                        error!("output pump error: {}", e);
                        break;
                    }
                }
            }
            sink.close();
            total
        })
        .await;

        match result {
            Ok(total) => total,
            Err(e) => {
                error!("output pump task panicked: {}", e);
                0
            }
        }
    }
}

/// Feeds commands pulled from a bridge source into the PTY.
pub struct InputPump<W: Write + Send + 'static> {
    source: BridgeSource,
    writer: W,
}

impl<W: Write + Send + 'static> InputPump<W> {
    /// Create a new InputPump.
    pub fn new(source: BridgeSource, writer: W) -> Self {
        Self { source, writer }
    }

    /// Run the pump until the bridge is closed.
    ///
    /// Each command is written and flushed as a whole when its boundary is
    /// reached. Bytes of a command interrupted by close are discarded. A write
    /// failure closes the bridge. Returns the number of commands written.
    pub async fn run(self) -> u64 {
        let source = self.source;
        let mut writer = self.writer;

        let result = tokio::task::spawn_blocking(move || {
            let mut command = Vec::new();
            let mut written = 0u64;

            loop {
                match source.next_event() {
                    SourceEvent::Byte(b) => command.push(b),
                    SourceEvent::Boundary => {
                        trace!("input pump: writing {} bytes", command.len());
                        if let Err(e) = writer.write_all(&command).and_then(|_| writer.flush()) {
                            if e.kind() == std::io::ErrorKind::BrokenPipe {
                                debug!("input pump: broken pipe");
                            } else {
                                error!("input pump error: {}", e);
                            }
                            source.close();
                            break;
                        }
                        command.clear();
                        written += 1;
                    }
                    SourceEvent::Closed => {
                        debug!(discarded = command.len(), "input pump: bridge closed");
                        break;
                    }
                }
            }
            written
        })
        .await;

        match result {
            Ok(written) => written,
            Err(e) => {
                error!("input pump task panicked: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShellBridge;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Writer that records everything into a shared vector.
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<u8>>>);

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_output_pump_fills_bridge() {
        let bridge = ShellBridge::new();
        let data = b"Hello, World!\nTest line 2\n";
        let pump = OutputPump::new(Cursor::new(data.to_vec()), bridge.sink()).with_buffer_size(5);

        let total = tokio::time::timeout(Duration::from_secs(2), pump.run())
            .await
            .unwrap();

        assert_eq!(total, data.len() as u64);
        assert!(bridge.is_closed());
        assert_eq!(bridge.read_line_peek().as_deref(), Some("Hello, World!\n"));
        assert_eq!(bridge.read_line_peek().as_deref(), Some("Test line 2\n"));
    }

    #[tokio::test]
    async fn test_output_pump_empty() {
        let bridge = ShellBridge::new();
        let pump = OutputPump::new(Cursor::new(Vec::new()), bridge.sink());

        let total = tokio::time::timeout(Duration::from_millis(500), pump.run())
            .await
            .unwrap();
        assert_eq!(total, 0);
        assert!(bridge.last_update().is_none());
    }

    #[tokio::test]
    async fn test_output_eof_releases_blocked_submitter() {
        let bridge = ShellBridge::new();
        assert!(bridge.send_command("exit\n"));

        // Nothing drains the first command, so this send waits until the
        // output side sees the shell go away.
        let submitter = bridge.clone();
        let blocked = tokio::task::spawn_blocking(move || submitter.send_command("ls\n"));

        let pump = OutputPump::new(Cursor::new(b"bye\n".to_vec()), bridge.sink());
        tokio::time::timeout(Duration::from_secs(2), pump.run())
            .await
            .unwrap();

        let accepted = tokio::time::timeout(Duration::from_secs(2), blocked)
            .await
            .unwrap()
            .unwrap();
        assert!(!accepted);
        assert_eq!(bridge.read_line_peek().as_deref(), Some("bye\n"));
    }

    #[tokio::test]
    async fn test_input_pump_writes_commands() {
        let bridge = ShellBridge::new();
        let recorder = Recorder::default();
        let handle = tokio::spawn(InputPump::new(bridge.source(), recorder.clone()).run());

        let driver = bridge.clone();
        tokio::task::spawn_blocking(move || {
            assert!(driver.send_command("ls\n"));
            assert!(driver.send_command("pwd\n"));
            assert!(driver.send_command(""));
            // Wait for the last command to drain before closing.
            assert!(driver.send_command("exit\n"));
            while !driver.is_command_sent() {
                std::thread::sleep(Duration::from_millis(5));
            }
            driver.close();
        })
        .await
        .unwrap();

        let written = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(written, 4);
        assert_eq!(&*recorder.0.lock().unwrap(), b"ls\npwd\nexit\n");
    }

    #[tokio::test]
    async fn test_input_pump_stops_on_write_error() {
        let bridge = ShellBridge::new();
        let handle = tokio::spawn(InputPump::new(bridge.source(), FailingWriter).run());

        assert!(bridge.send_command("ls\n"));
        let written = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(written, 0);
        assert!(bridge.is_closed());
    }

    #[tokio::test]
    async fn test_write_error_does_not_block_later_sends() {
        let bridge = ShellBridge::new();
        let handle = tokio::spawn(InputPump::new(bridge.source(), FailingWriter).run());

        assert!(bridge.send_command("exit\n"));
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();

        let driver = bridge.clone();
        let sends = tokio::task::spawn_blocking(move || {
            (driver.send_command("ls\n"), driver.send_command("pwd\n"))
        });
        let (first, second) = tokio::time::timeout(Duration::from_secs(2), sends)
            .await
            .unwrap()
            .unwrap();
        assert!(!first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_input_pump_stops_on_close() {
        let bridge = ShellBridge::new();
        let handle = tokio::spawn(InputPump::new(bridge.source(), Recorder::default()).run());

        bridge.close();
        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok());
    }
}
