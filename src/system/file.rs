//! File candidates: what a file picker or paste hands over before validation.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FileSource {
    Memory(Vec<u8>),
    Disk(PathBuf),
}

/// A file with a declared MIME type and byte size. Content is read lazily for
/// files on disk, so a later read can still fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    name: String,
    mime_type: String,
    size: u64,
    source: FileSource,
}

/// MIME type a browser would declare for the given file name.
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("bmp") => "image/bmp",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

impl FileCandidate {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: content.len() as u64,
            source: FileSource::Memory(content),
        }
    }

    /// Stats a file on disk; the MIME type comes from its extension.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_from_name(&name).to_string();
        debug!(path = %path.display(), size = meta.len(), mime = %mime_type, "Opened file candidate");

        Ok(Self {
            name,
            mime_type,
            size: meta.len(),
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Full binary content.
    pub async fn read(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Disk(path) => tokio::fs::read(path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_from_name("scan.JPG"), "image/jpeg");
        assert_eq!(mime_from_name("scan.jpeg"), "image/jpeg");
        assert_eq!(mime_from_name("a.png"), "image/png");
        assert_eq!(mime_from_name("a.bmp"), "image/bmp");
        assert_eq!(mime_from_name("a.gif"), "image/gif");
        assert_eq!(mime_from_name("notes.txt"), "application/octet-stream");
        assert_eq!(mime_from_name("no_extension"), "application/octet-stream");
    }

    #[tokio::test]
    async fn open_reads_metadata_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        std::fs::write(&path, b"\x89PNG fake").unwrap();

        let file = FileCandidate::open(&path).await.unwrap();
        assert_eq!(file.name(), "page.png");
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.size(), 9);
        assert_eq!(file.read().await.unwrap(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn open_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileCandidate::open(dir.path().join("absent.png")).await.is_err());
        assert!(FileCandidate::open(dir.path()).await.is_err());
    }
}
