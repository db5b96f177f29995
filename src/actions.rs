//! High-level execution of user-triggered actions: health check, recognize a file,
//! recognize the image on the clipboard.
//!
//! Each action wires the pieces together the way the web frontend does: validate
//! first, encode, send, then optionally copy the recognized text. Failures have
//! already been shown to the user through the notifier when they come back here.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{ApiError, OcrClient};
use crate::notify::Notifier;
use crate::ocr::{HealthStatus, OcrResult};
use crate::system::{self, ClipboardAdapter, FileCandidate};
use crate::validator;

const MSG_READ_FAILED: &str = "failed to read file";
const MSG_NO_IMAGE: &str = "no image on the clipboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Health,
    Recognize { path: PathBuf, copy: bool },
    Paste { copy: bool },
}

impl AppAction {
    /// Parses `health`, `recognize <image> [--copy]`, `paste [--copy]`.
    pub fn parse<I, S>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let copy = args.iter().any(|a| a == "--copy");
        let mut positional = args.iter().filter(|a| !a.starts_with("--"));

        let unknown_flag = args
            .iter()
            .find(|a| a.starts_with("--") && a.as_str() != "--copy");
        if let Some(flag) = unknown_flag {
            return Err(format!("unknown option: {flag}"));
        }

        let action = match positional.next().map(String::as_str) {
            Some("health") => Self::Health,
            Some("recognize") => {
                let path = positional
                    .next()
                    .ok_or_else(|| "recognize needs an image path".to_string())?;
                Self::Recognize {
                    path: PathBuf::from(path),
                    copy,
                }
            }
            Some("paste") => Self::Paste { copy },
            Some(other) => return Err(format!("unknown command: {other}")),
            None => return Err("missing command".to_string()),
        };

        if let Some(extra) = positional.next() {
            return Err(format!("unexpected argument: {extra}"));
        }
        Ok(action)
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Copy to clipboard failed")]
    Copy,
}

/// What an action needs from the outside world.
pub struct ActionContext {
    pub client: OcrClient,
    pub notifier: Arc<dyn Notifier>,
}

/// Runs one action. Returns the text to print on success.
pub async fn execute_action(
    ctx: &ActionContext,
    action: AppAction,
) -> Result<String, ActionError> {
    debug!(?action, "Executing action");
    match action {
        AppAction::Health => {
            let payload = ctx.client.health_check().await?;
            match HealthStatus::from_payload(payload.clone()) {
                Ok(health) if health.is_ok() => {
                    info!(service = ?health.service, workers = ?health.max_workers, "Backend healthy");
                }
                Ok(health) => warn!(status = %health.status, "Backend reports non-ok status"),
                Err(e) => debug!(error = %e, "Health payload has unexpected shape"),
            }
            Ok(payload.to_string())
        }
        AppAction::Recognize { path, copy } => {
            let file = match FileCandidate::open(&path).await {
                Ok(file) => file,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Failed to open image");
                    ctx.notifier.error(MSG_READ_FAILED);
                    return Err(e.into());
                }
            };
            recognize_file(ctx, Some(file), copy).await
        }
        AppAction::Paste { copy } => {
            let event = system::read_paste_event();
            let file = system::extract_image(&event);
            if file.is_none() {
                ctx.notifier.warning(MSG_NO_IMAGE);
                return Err(ActionError::Rejected(MSG_NO_IMAGE.to_string()));
            }
            recognize_file(ctx, file, copy).await
        }
    }
}

async fn recognize_file(
    ctx: &ActionContext,
    file: Option<FileCandidate>,
    copy: bool,
) -> Result<String, ActionError> {
    let validation = validator::validate(file.as_ref());
    let Some(file) = file.filter(|_| validation.valid) else {
        ctx.notifier.warning(&validation.message);
        return Err(ActionError::Rejected(validation.message));
    };

    let image_base64 = match validator::encode(&file).await {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!(error = %e, name = %file.name(), "Failed to encode image");
            ctx.notifier.error(MSG_READ_FAILED);
            return Err(e.into());
        }
    };

    let payload = ctx.client.recognize(&image_base64).await?;
    let text = match OcrResult::from_payload(payload.clone()) {
        Ok(result) => {
            if result.is_empty() {
                warn!("OCR finished but no text was detected");
            } else {
                info!(lines = result.detailed.len(), "OCR finished");
            }
            result.plain_text
        }
        Err(e) => {
            debug!(error = %e, "OCR payload has unexpected shape, returning raw JSON");
            payload.to_string()
        }
    };

    if copy {
        let mut clipboard = ClipboardAdapter::system(Arc::clone(&ctx.notifier));
        if !clipboard.copy_text(Some(&text)) {
            return Err(ActionError::Copy);
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::notify::{ChannelNotifier, Notice, NoticeLevel};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::mpsc;

    fn context(base_url: String) -> (ActionContext, mpsc::Receiver<Notice>) {
        let (notifier, rx) = ChannelNotifier::new();
        let notifier: Arc<dyn Notifier> = Arc::new(notifier);
        let client = OcrClient::new(ClientConfig::with_base_url(base_url), Arc::clone(&notifier))
            .unwrap();
        (ActionContext { client, notifier }, rx)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(AppAction::parse(["health"]), Ok(AppAction::Health));
        assert_eq!(
            AppAction::parse(["recognize", "scan.png", "--copy"]),
            Ok(AppAction::Recognize {
                path: PathBuf::from("scan.png"),
                copy: true
            })
        );
        assert_eq!(
            AppAction::parse(["paste"]),
            Ok(AppAction::Paste { copy: false })
        );
        assert!(AppAction::parse(["recognize"]).is_err());
        assert!(AppAction::parse(["paste", "--verbose"]).is_err());
        assert!(AppAction::parse(Vec::<String>::new()).is_err());
        assert!(AppAction::parse(["dance"]).is_err());
    }

    #[test]
    fn rejects_extra_positional_arguments() {
        assert_eq!(
            AppAction::parse(["recognize", "a.png", "b.png"]),
            Err("unexpected argument: b.png".to_string())
        );
        assert!(AppAction::parse(["health", "now"]).is_err());
        assert!(AppAction::parse(["paste", "--copy", "extra"]).is_err());
    }

    #[tokio::test]
    async fn recognize_sends_valid_file_and_returns_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"hello").unwrap();

        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/ocr")
            .match_body(Matcher::Json(json!({"image": "aGVsbG8="})))
            .with_status(200)
            .with_body(r#"{"plain_text":"line 1\nline 2","detailed":[]}"#)
            .create_async()
            .await;

        let (ctx, _rx) = context(server.url());
        let text = execute_action(&ctx, AppAction::Recognize { path, copy: false })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(text, "line 1\nline 2");
    }

    #[tokio::test]
    async fn empty_recognition_returns_empty_text_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.bmp");
        std::fs::write(&path, b"BM").unwrap();

        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/ocr")
            .with_status(200)
            .with_body(r#"{"plain_text":"","detailed":[]}"#)
            .create_async()
            .await;

        let (ctx, rx) = context(server.url());
        let text = execute_action(&ctx, AppAction::Recognize { path, copy: false })
            .await
            .unwrap();

        assert_eq!(text, "");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn invalid_file_is_never_sent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"text").unwrap();

        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/ocr")
            .expect(0)
            .create_async()
            .await;

        let (ctx, rx) = context(server.url());
        let err = execute_action(&ctx, AppAction::Recognize { path, copy: false })
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ActionError::Rejected(ref m) if m == "unsupported format, only JPG/PNG/BMP"));
        assert_eq!(
            rx.try_recv().unwrap(),
            Notice {
                level: NoticeLevel::Warning,
                message: "unsupported format, only JPG/PNG/BMP".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let (ctx, rx) = context("http://127.0.0.1:9".into());
        let err = execute_action(
            &ctx,
            AppAction::Recognize {
                path: PathBuf::from("/definitely/not/here.png"),
                copy: false,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ActionError::Read(_)));
        assert_eq!(rx.try_recv().unwrap().message, "failed to read file");
    }

    #[tokio::test]
    async fn backend_error_surfaces_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/ocr")
            .with_status(429)
            .with_body(r#"{"error":"busy"}"#)
            .create_async()
            .await;

        let (ctx, rx) = context(server.url());
        let err = execute_action(&ctx, AppAction::Recognize { path, copy: false })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "service busy, retry later");
        let notices: Vec<Notice> = rx.try_iter().collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }
}
