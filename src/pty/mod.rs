//! Local PTY transport.
//!
//! Spawns a shell in a pseudo-terminal and pumps bytes between it and a
//! [`ShellBridge`](crate::ShellBridge): PTY output flows into the bridge sink,
//! commands pulled from the bridge source flow into the PTY.

mod native;
mod pump;

pub use native::{default_shell, NativePty, SpawnedShell};
pub use pump::{InputPump, OutputPump};

/// Size of a PTY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtySize {
    /// Number of rows (height).
    pub rows: u16,
    /// Number of columns (width).
    pub cols: u16,
    /// Width in pixels, 0 if unknown.
    pub pixel_width: u16,
    /// Height in pixels, 0 if unknown.
    pub pixel_height: u16,
}

impl PtySize {
    /// Create a new PtySize with the given dimensions.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    /// Set the pixel dimensions.
    pub fn with_pixels(mut self, width: u16, height: u16) -> Self {
        self.pixel_width = width;
        self.pixel_height = height;
        self
    }
}

impl Default for PtySize {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

impl From<PtySize> for portable_pty::PtySize {
    fn from(size: PtySize) -> Self {
        Self {
            rows: size.rows,
            cols: size.cols,
            pixel_width: size.pixel_width,
            pixel_height: size.pixel_height,
        }
    }
}

/// How to spawn the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtyOptions {
    /// Shell program. `None` uses [`default_shell`].
    pub shell: Option<String>,
    /// Value for `TERM`. `None` leaves it inherited.
    pub term: Option<String>,
    /// Terminal geometry.
    pub size: PtySize,
}

impl Default for PtyOptions {
    fn default() -> Self {
        Self {
            shell: None,
            term: Some("dumb".to_string()),
            size: PtySize::default(),
        }
    }
}
