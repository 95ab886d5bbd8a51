//! System clipboard access
//!
//! The observation loop only needs plain text read/write, so the clipboard is
//! a small trait: the desktop implementation goes through `arboard`, tests and
//! headless runs use [`MemoryClipboard`].

use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    Write(String),
}

/// Plain-text clipboard
pub trait Clipboard: Send + Sync {
    /// Current text; empty when the clipboard holds no text.
    fn read_text(&self) -> Result<String, ClipboardError>;

    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Desktop clipboard via `arboard`
///
/// One handle lives as long as this value. On Linux the process that wrote
/// the clipboard serves its contents, and they disappear when the last handle
/// is dropped.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    /// Connect to the desktop clipboard.
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, arboard::Clipboard>, ClipboardError> {
        self.inner
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard handle poisoned".to_string()))
    }
}

impl Clipboard for SystemClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        match self.lock()?.get_text() {
            Ok(text) => Ok(text),
            // Non-text content (images, files) reads as empty
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
        }
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.lock()?
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Write(e.to_string()))?;
        debug!(chars = text.len(), "Wrote clipboard text");
        Ok(())
    }
}

/// In-process clipboard
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Mutex<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, String>, ClipboardError> {
        self.text
            .lock()
            .map_err(|_| ClipboardError::Unavailable("memory clipboard poisoned".to_string()))
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        Ok(self.lock()?.clone())
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.lock()? = text.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_round_trip() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.read_text().unwrap(), "");
        clipboard.write_text("56.828106, 60.614287").unwrap();
        assert_eq!(clipboard.read_text().unwrap(), "56.828106, 60.614287");
    }

    #[test]
    fn test_system_clipboard_keeps_written_text() {
        // Headless machines have no clipboard to connect to
        let clipboard = match SystemClipboard::new() {
            Ok(clipboard) => clipboard,
            Err(e) => {
                assert!(matches!(e, ClipboardError::Unavailable(_)));
                return;
            }
        };

        clipboard.write_text("54.996659, 82.804552").unwrap();
        assert_eq!(clipboard.read_text().unwrap(), "54.996659, 82.804552");
        clipboard.write_text("56.828106, 60.614287").unwrap();
        assert_eq!(clipboard.read_text().unwrap(), "56.828106, 60.614287");
    }
}
