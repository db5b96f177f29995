//! Native clipboard access through `arboard`.

use arboard::Clipboard;
use tracing::debug;

use super::{ClipboardError, TextSink};

/// The system clipboard, opened once. Unavailable when no clipboard can be opened
/// (headless sessions, missing display server).
pub struct NativeClipboard {
    inner: Option<Clipboard>,
}

impl NativeClipboard {
    pub fn new() -> Self {
        let inner = match Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                debug!(error = %e, "Native clipboard unavailable");
                None
            }
        };
        Self { inner }
    }
}

impl Default for NativeClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSink for NativeClipboard {
    fn name(&self) -> &'static str {
        "native"
    }

    fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("no native clipboard".into()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}
