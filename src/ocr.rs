//! Typed views of the OCR service payloads.
//!
//! The client hands back raw JSON; these are for callers that want fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub max_workers: Option<u32>,
}

impl HealthStatus {
    pub fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(payload)
    }

    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// One recognized line with its quadrilateral (four corner points, pixels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    pub confidence: f64,
    #[serde(rename = "box", default)]
    pub bounding_box: Vec<[f64; 2]>,
}

/// Body of a successful `POST /api/ocr`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OcrResult {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub detailed: Vec<OcrLine>,
}

impl OcrResult {
    pub fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(payload)
    }

    pub fn is_empty(&self) -> bool {
        self.plain_text.trim().is_empty() && self.detailed.is_empty()
    }
}
