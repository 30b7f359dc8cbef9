//! Clipboard capability
//!
//! Copying is the only way encoded text leaves the session. Backends
//! report failure as [`ComposerError::Clipboard`]; the session records it
//! and carries on.

use std::io::{self, Write};

use crossterm::clipboard::CopyToClipboard;
use crossterm::execute;

use crate::error::{ComposerError, Result};

/// Something that accepts text for the system clipboard
pub trait Clipboard {
    /// Replace the clipboard contents
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Copies through the terminal emulator with an OSC 52 sequence
pub struct TerminalClipboard<W: Write> {
    out: W,
}

impl TerminalClipboard<io::Stdout> {
    /// Write to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalClipboard<W> {
    /// Write to any terminal stream
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Get the underlying stream back
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Clipboard for TerminalClipboard<W> {
    fn write_text(&mut self, text: &str) -> Result<()> {
        execute!(self.out, CopyToClipboard::to_clipboard_from(text))
            .map_err(|e| ComposerError::Clipboard(e.to_string()))
    }
}

/// In-process clipboard, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    failing: bool,
}

impl MemoryClipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard that rejects every write
    pub fn failing() -> Self {
        Self {
            contents: None,
            failing: true,
        }
    }

    /// Last text written
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Make writes fail or succeed
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.failing {
            return Err(ComposerError::Clipboard("clipboard unavailable".to_string()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.contents(), None);
        clipboard.write_text("hello").unwrap();
        assert_eq!(clipboard.contents(), Some("hello"));

        clipboard.set_failing(true);
        let err = clipboard.write_text("again").unwrap_err();
        assert!(matches!(err, ComposerError::Clipboard(_)));
        assert_eq!(clipboard.contents(), Some("hello"));
    }

    #[test]
    fn test_terminal_clipboard_emits_osc52() {
        let mut clipboard = TerminalClipboard::new(Vec::new());
        clipboard.write_text("hi").unwrap();
        let written = String::from_utf8(clipboard.into_inner()).unwrap();
        assert!(written.contains("52;c;aGk="), "got {:?}", written);
    }
}
