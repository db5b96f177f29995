//! Paste events and image extraction.

use std::io::Cursor;

use arboard::Clipboard;
use image::{ImageFormat, RgbaImage};
use tracing::{debug, warn};

use crate::system::FileCandidate;

const PASTED_IMAGE_NAME: &str = "pasted.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPayload {
    Text(String),
    File(FileCandidate),
    /// Declared but not retrievable as a file.
    Unreadable,
}

/// One typed entry of a paste event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    mime_type: String,
    payload: ItemPayload,
}

impl ClipboardItem {
    pub fn new(mime_type: impl Into<String>, payload: ItemPayload) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new("text/plain", ItemPayload::Text(text.into()))
    }

    pub fn file(file: FileCandidate) -> Self {
        Self::new(file.mime_type().to_string(), ItemPayload::File(file))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.contains("image")
    }

    pub fn as_file(&self) -> Option<FileCandidate> {
        match &self.payload {
            ItemPayload::File(file) => Some(file.clone()),
            ItemPayload::Text(_) | ItemPayload::Unreadable => None,
        }
    }
}

/// What a paste delivers. `items` is `None` when the event carried no clipboard data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteEvent {
    pub items: Option<Vec<ClipboardItem>>,
}

impl PasteEvent {
    pub fn new(items: Vec<ClipboardItem>) -> Self {
        Self { items: Some(items) }
    }

    pub fn empty() -> Self {
        Self { items: None }
    }
}

/// The file behind the first image item, in item order. No size or type policy is
/// applied here; run the result through `validator::validate`.
pub fn extract_image(event: &PasteEvent) -> Option<FileCandidate> {
    let items = event.items.as_ref()?;
    let item = items.iter().find(|item| item.is_image())?;
    debug!(mime = %item.mime_type(), "Found image item in paste");
    item.as_file()
}

/// Captures the system clipboard as a paste event: text first, then an image as PNG.
pub fn read_paste_event() -> PasteEvent {
    let mut clipboard = match Clipboard::new() {
        Ok(cb) => cb,
        Err(e) => {
            warn!(error = %e, "Failed to open clipboard for paste");
            return PasteEvent::empty();
        }
    };

    let mut items = Vec::new();

    if let Ok(text) = clipboard.get_text() {
        if !text.is_empty() {
            debug!(len = text.len(), "Clipboard has text");
            items.push(ClipboardItem::text(text));
        }
    }

    match clipboard.get_image() {
        Ok(img) => {
            let item = match encode_png(img.width as u32, img.height as u32, img.bytes.into_owned()) {
                Some(png) => ClipboardItem::file(FileCandidate::from_bytes(
                    PASTED_IMAGE_NAME,
                    "image/png",
                    png,
                )),
                None => ClipboardItem::new("image/png", ItemPayload::Unreadable),
            };
            items.push(item);
        }
        Err(e) => debug!(error = %e, "Clipboard has no image"),
    }

    PasteEvent::new(items)
}

/// Encodes raw RGBA pixels as PNG.
fn encode_png(width: u32, height: u32, rgba: Vec<u8>) -> Option<Vec<u8>> {
    let Some(image) = RgbaImage::from_raw(width, height, rgba) else {
        warn!(width, height, "Clipboard image has inconsistent dimensions");
        return None;
    };

    let mut out = Cursor::new(Vec::new());
    if let Err(e) = image.write_to(&mut out, ImageFormat::Png) {
        warn!(error = %e, "Failed to encode clipboard image as PNG");
        return None;
    }
    debug!(width, height, bytes = out.get_ref().len(), "Encoded clipboard image");
    Some(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_file() -> FileCandidate {
        FileCandidate::from_bytes("shot.png", "image/png", vec![1, 2, 3])
    }

    #[test]
    fn no_items_yields_nothing() {
        assert_eq!(extract_image(&PasteEvent::empty()), None);
        assert_eq!(extract_image(&PasteEvent::new(Vec::new())), None);
    }

    #[test]
    fn skips_text_and_returns_first_image() {
        let event = PasteEvent::new(vec![
            ClipboardItem::text("hello"),
            ClipboardItem::file(png_file()),
            ClipboardItem::file(FileCandidate::from_bytes("b.bmp", "image/bmp", vec![9])),
        ]);

        assert_eq!(extract_image(&event), Some(png_file()));
    }

    #[test]
    fn text_only_yields_nothing() {
        let event = PasteEvent::new(vec![ClipboardItem::text("a"), ClipboardItem::text("b")]);
        assert_eq!(extract_image(&event), None);
    }

    #[test]
    fn first_image_item_wins_even_when_unreadable() {
        let event = PasteEvent::new(vec![
            ClipboardItem::new("image/tiff", ItemPayload::Unreadable),
            ClipboardItem::file(png_file()),
        ]);
        assert_eq!(extract_image(&event), None);
    }

    #[test]
    fn image_match_is_not_limited_to_allowed_types() {
        let gif = FileCandidate::from_bytes("a.gif", "image/gif", vec![0]);
        let event = PasteEvent::new(vec![ClipboardItem::file(gif.clone())]);
        assert_eq!(extract_image(&event), Some(gif));
    }

    #[test]
    fn encodes_rgba_pixels_as_png() {
        let png = encode_png(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert!(encode_png(2, 2, vec![0; 4]).is_none());
    }
}
