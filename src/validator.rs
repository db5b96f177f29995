//! Upload policy checks and Base64 encoding for transport.
//!
//! A file goes to the OCR backend only if it passes both the type allow-list
//! and the size ceiling. Validation failures are returned as values, never errors.

use base64::{engine::general_purpose, Engine as _};
use tracing::debug;

use crate::system::FileCandidate;

pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/bmp"];

/// 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

pub fn check_type(file: Option<&FileCandidate>) -> bool {
    file.is_some_and(|f| ALLOWED_MIME_TYPES.contains(&f.mime_type()))
}

pub fn check_size(file: Option<&FileCandidate>) -> bool {
    file.is_some_and(|f| f.size() <= MAX_FILE_SIZE)
}

/// First failing check wins: presence, then type, then size.
pub fn validate(file: Option<&FileCandidate>) -> Validation {
    let Some(candidate) = file else {
        return Validation::rejected("select a file");
    };

    if !check_type(file) {
        debug!(mime = %candidate.mime_type(), "Rejected file type");
        return Validation::rejected("unsupported format, only JPG/PNG/BMP");
    }

    if !check_size(file) {
        let size_mb = candidate.size() as f64 / 1024.0 / 1024.0;
        debug!(size = candidate.size(), "Rejected file size");
        return Validation::rejected(format!(
            "file size exceeds limit ({size_mb:.2}MB > 10MB)"
        ));
    }

    Validation::ok()
}

/// Drops a `data:<mime>;base64,` header, keeping everything after the first comma.
/// Input without a header is returned unchanged.
pub fn strip_data_url_prefix(data: &str) -> &str {
    if !data.starts_with("data:") {
        return data;
    }
    data.split_once(',').map_or("", |(_, payload)| payload)
}

/// Reads the whole file and returns its Base64 text, without any data-URL header.
pub async fn encode(file: &FileCandidate) -> std::io::Result<String> {
    let bytes = file.read().await?;
    let encoded = general_purpose::STANDARD.encode(&bytes);
    debug!(bytes = bytes.len(), encoded = encoded.len(), "Encoded file");
    Ok(encoded)
}
