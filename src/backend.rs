//! Web OCR service HTTP API client.
//!
//! Calls the backend `GET /health` and `POST /api/ocr`. Successful calls return only the
//! JSON payload, never status or headers. Failed calls are classified into one user-facing
//! message, reported once through the client's `Notifier`, and returned as `ApiError`.
//! Nothing here retries: one failed call is one reported failure.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::notify::Notifier;

/// Where requests go when the base URL is empty: the backend serves the frontend itself.
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:5000";

const HEALTH_PATH: &str = "/health";
const OCR_PATH: &str = "/api/ocr";

const MSG_INVALID_REQUEST: &str = "invalid request parameters";
const MSG_FILE_TOO_LARGE: &str = "file size exceeds limit";
const MSG_SERVICE_BUSY: &str = "service busy, retry later";
const MSG_INTERNAL_ERROR: &str = "internal server error";
const MSG_OCR_TIMEOUT: &str = "OCR processing timed out, try a smaller image";
const MSG_NETWORK: &str = "network connection failed, check backend service";
const MSG_UNKNOWN: &str = "unknown error";

/// What the transport produced for a call that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    /// The server answered with a non-2xx status.
    Response { status: u16, body: String },
    /// The request went out but no response came back (refused, reset, timed out).
    NoResponse { message: String },
    /// The request could not be built or sent at all.
    SendFailure { message: String },
}

/// A failure reduced to what the user is told.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClassifiedError {
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// The `error` field of a JSON error body, if there is a non-empty one.
fn server_error_text(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|s| !s.is_empty())
}

/// Maps a failed transport outcome to its user-facing message. Pure and deterministic.
pub fn classify(outcome: &TransportOutcome) -> ClassifiedError {
    match outcome {
        TransportOutcome::Response { status, body } => {
            let server_text = || server_error_text(body);
            let message = match *status {
                400 => server_text().unwrap_or_else(|| MSG_INVALID_REQUEST.to_string()),
                413 => MSG_FILE_TOO_LARGE.to_string(),
                429 => MSG_SERVICE_BUSY.to_string(),
                500 => server_text().unwrap_or_else(|| MSG_INTERNAL_ERROR.to_string()),
                504 => MSG_OCR_TIMEOUT.to_string(),
                other => server_text().unwrap_or_else(|| format!("request failed (status {other})")),
            };
            ClassifiedError {
                status: Some(*status),
                message,
            }
        }
        TransportOutcome::NoResponse { .. } => ClassifiedError {
            status: None,
            message: MSG_NETWORK.to_string(),
        },
        TransportOutcome::SendFailure { message } => ClassifiedError {
            status: None,
            message: if message.trim().is_empty() {
                MSG_UNKNOWN.to_string()
            } else {
                message.clone()
            },
        },
    }
}

/// A failed call. Displays as the classified user-facing message.
#[derive(Debug, Error)]
#[error("{classified}")]
pub struct ApiError {
    classified: ClassifiedError,
    outcome: TransportOutcome,
    #[source]
    source: Option<reqwest::Error>,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        self.classified.status
    }

    pub fn message(&self) -> &str {
        &self.classified.message
    }

    pub fn outcome(&self) -> &TransportOutcome {
        &self.outcome
    }
}

#[derive(Serialize)]
struct OcrRequest<'a> {
    image: &'a str,
}

/// Successful bodies are JSON; anything else is handed back as a string value.
fn unwrap_payload(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

pub struct OcrClient {
    http: reqwest::Client,
    base_url: String,
    notifier: Arc<dyn Notifier>,
}

impl OcrClient {
    /// Builds the underlying HTTP client: fixed timeout and JSON content type on every request.
    pub fn new(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let base_url = match config.base_url.trim() {
            "" => DEFAULT_ORIGIN.to_string(),
            base => base.trim_end_matches('/').to_string(),
        };
        debug!(base_url = %base_url, timeout_secs = config.timeout.as_secs(), "OCR client ready");

        Ok(Self {
            http,
            base_url,
            notifier,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`. Returns the backend's JSON body.
    pub async fn health_check(&self) -> Result<Value, ApiError> {
        self.request::<()>(Method::GET, HEALTH_PATH, None).await
    }

    /// `POST /api/ocr` with `{"image": <base64>}`. The image is not validated here;
    /// run it through `validator::validate` first.
    pub async fn recognize(&self, image_base64: &str) -> Result<Value, ApiError> {
        info!(base64_len = image_base64.len(), "Submitting image for OCR");
        let body = OcrRequest {
            image: image_base64,
        };
        self.request(Method::POST, OCR_PATH, Some(&body)).await
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, url = %url, "Sending request");

        let mut builder = self.http.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        match execute(builder).await {
            Ok(payload) => Ok(payload),
            Err((outcome, source)) => Err(self.fail(outcome, source)),
        }
    }

    fn fail(&self, outcome: TransportOutcome, source: Option<reqwest::Error>) -> ApiError {
        let classified = classify(&outcome);
        match &outcome {
            TransportOutcome::Response { status, .. } => {
                warn!(status, user_message = %classified.message, "OCR backend returned an error")
            }
            TransportOutcome::NoResponse { message } | TransportOutcome::SendFailure { message } => {
                warn!(error = %message, user_message = %classified.message, "OCR request failed")
            }
        }
        self.notifier.error(&classified.message);
        ApiError {
            classified,
            outcome,
            source,
        }
    }
}

async fn execute(
    builder: RequestBuilder,
) -> Result<Value, (TransportOutcome, Option<reqwest::Error>)> {
    let response = builder.send().await.map_err(|e| {
        let message = e.to_string();
        let outcome = if e.is_builder() {
            TransportOutcome::SendFailure { message }
        } else {
            TransportOutcome::NoResponse { message }
        };
        (outcome, Some(e))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        (
            TransportOutcome::NoResponse {
                message: e.to_string(),
            },
            Some(e),
        )
    })?;

    if status.is_success() {
        debug!(status = status.as_u16(), bytes = body.len(), "Response received");
        Ok(unwrap_payload(&body))
    } else {
        Err((
            TransportOutcome::Response {
                status: status.as_u16(),
                body,
            },
            None,
        ))
    }
}
