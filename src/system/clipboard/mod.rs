//! Clipboard interop: copying text out, pulling images from paste events.
//!
//! Copying checks the preferred sink first and falls back to the other one when the
//! preferred sink cannot be used. On Linux and the BSDs the preferred sink is the copy
//! helper (`wl-copy`/`xclip`), which keeps serving the selection after this process
//! exits; an arboard selection is dropped with the process. Elsewhere the native
//! clipboard goes first.

mod command;
mod native;
mod paste;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::notify::Notifier;

pub use command::CommandClipboard;
pub use native::NativeClipboard;
pub use paste::{extract_image, read_paste_event, ClipboardItem, ItemPayload, PasteEvent};

const MSG_NOTHING_TO_COPY: &str = "nothing to copy";
const MSG_COPIED: &str = "copied to clipboard";
const MSG_COPY_FAILED: &str = "copy failed, please copy manually";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard write failed: {0}")]
    Write(String),
    #[error("Copy helper `{program}` exited with {code:?}")]
    Rejected { program: String, code: Option<i32> },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A way of putting text on the system clipboard.
pub trait TextSink {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Can this sink be used right now?
    fn is_available(&self) -> bool;

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

pub struct ClipboardAdapter {
    primary: Box<dyn TextSink>,
    fallback: Box<dyn TextSink>,
    notifier: Arc<dyn Notifier>,
}

impl ClipboardAdapter {
    pub fn new(
        primary: Box<dyn TextSink>,
        fallback: Box<dyn TextSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            primary,
            fallback,
            notifier,
        }
    }

    /// The platform's clipboard sinks in preference order.
    pub fn system(notifier: Arc<dyn Notifier>) -> Self {
        let helper: Box<dyn TextSink> = Box::new(CommandClipboard::detect());
        let native: Box<dyn TextSink> = Box::new(NativeClipboard::new());
        if cfg!(any(target_os = "macos", target_os = "windows")) {
            Self::new(native, helper, notifier)
        } else {
            Self::new(helper, native, notifier)
        }
    }

    /// Name of the sink tried first.
    pub fn primary_name(&self) -> &'static str {
        self.primary.name()
    }

    /// Copies `text` and tells the user how it went. Never fails into the caller;
    /// the return value says whether the text reached the clipboard.
    pub fn copy_text(&mut self, text: Option<&str>) -> bool {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            debug!("Nothing to copy");
            self.notifier.warning(MSG_NOTHING_TO_COPY);
            return false;
        };

        let sink = if self.primary.is_available() {
            &mut self.primary
        } else {
            debug!(
                unavailable = self.primary.name(),
                using = self.fallback.name(),
                "Preferred clipboard unavailable, falling back"
            );
            &mut self.fallback
        };
        let path = sink.name();

        match sink.write_text(text) {
            Ok(()) => {
                info!(chars = text.len(), path, "Copied text to clipboard");
                self.notifier.success(MSG_COPIED);
                true
            }
            Err(e) => {
                warn!(error = %e, path, "Copy to clipboard failed");
                self.notifier.error(MSG_COPY_FAILED);
                false
            }
        }
    }
}
