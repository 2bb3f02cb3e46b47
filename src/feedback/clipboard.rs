//! Clipboard backends.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::io::Write;

/// A place copied text can be written to.
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Clipboard`] if the write fails.
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Terminal clipboard using the OSC 52 escape sequence.
///
/// Terminals that support OSC 52 (and most multiplexers with it enabled)
/// place the payload on the system clipboard, including over SSH.
pub struct Osc52Clipboard<W> {
    out: Mutex<W>,
}

impl Osc52Clipboard<std::io::Stdout> {
    /// Clipboard that writes the escape sequence to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Osc52Clipboard<W> {
    /// Wrap a writer connected to the terminal.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consume the clipboard and return the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn write_text(&self, text: &str) -> Result<()> {
        let sequence = format!("\x1b]52;c;{}\x07", base64::encode(text));
        let mut out = self.out.lock();
        out.write_all(sequence.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}
