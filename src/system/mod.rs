//! System interactions (clipboard, files)

pub mod clipboard;
mod file;

pub use clipboard::{
    extract_image, read_paste_event, ClipboardAdapter, ClipboardError, ClipboardItem,
    CommandClipboard, ItemPayload, NativeClipboard, PasteEvent, TextSink,
};
pub use file::{mime_from_name, FileCandidate};
