//! Upload validation and the JSON response envelope.
//!
//! An upload is checked for size and format before anything is parsed.
//! HWPX packages go through text extraction; legacy binary HWP files are
//! refused with guidance; every other format is passed through as raw
//! bytes for the caller to forward unchanged.

use serde::Serialize;
use thiserror::Error;

use crate::error::Error as ExtractError;
use crate::io::Upload;
use crate::text::extract_hwpx_text;

/// Default upload size limit (15 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 15 * 1024 * 1024;

/// Default limit on extracted characters forwarded downstream.
pub const DEFAULT_MAX_CHARS: usize = 20_000;

/// Shown when a legacy `.hwp` file is uploaded.
pub const LEGACY_HWP_GUIDANCE: &str = "HWP(구 버전) 파일은 지원하지 않습니다. \
한글에서 '다른 이름으로 저장'으로 HWPX 또는 PDF 형식으로 저장한 뒤 다시 업로드해 주세요.";

/// Shown when an HWPX package yields no text.
pub const NO_CONTENT_GUIDANCE: &str = "HWPX 파일에서 본문 텍스트를 찾지 못했습니다. \
PDF 또는 DOCX 형식으로 저장한 뒤 다시 시도해 주세요.";

/// Size limits applied to every upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_bytes: u64,
    pub max_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Upload format, decided by file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadKind {
    Hwpx,
    LegacyHwp,
    /// Any other extension, lower-cased (empty when there is none)
    Other(String),
}

impl UploadKind {
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "hwpx" => UploadKind::Hwpx,
            "hwp" => UploadKind::LegacyHwp,
            _ => UploadKind::Other(ext),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UploadKind::Hwpx => "hwpx",
            UploadKind::LegacyHwp => "hwp",
            UploadKind::Other(ext) => ext,
        }
    }
}

/// Result of preparing an upload for forwarding.
#[derive(Debug, PartialEq, Eq)]
pub enum Prepared<'a> {
    /// Text extracted from an HWPX package
    Text {
        text: String,
        /// Characters before truncation
        chars: usize,
        truncated: bool,
    },
    /// Other formats, forwarded as-is
    Raw(&'a [u8]),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("file too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("{}", LEGACY_HWP_GUIDANCE)]
    LegacyHwp,

    #[error("{}", NO_CONTENT_GUIDANCE)]
    Unprocessable(#[source] ExtractError),
}

impl UploadError {
    /// HTTP status the surrounding handler answers with.
    pub fn status(&self) -> u16 {
        match self {
            UploadError::Empty | UploadError::LegacyHwp => 400,
            UploadError::TooLarge { .. } => 413,
            UploadError::Unprocessable(_) => 415,
        }
    }
}

/// Validate an upload and extract its text when it is an HWPX package.
pub fn prepare<'a>(upload: &'a Upload, limits: &Limits) -> Result<Prepared<'a>, UploadError> {
    let size = upload.bytes.len() as u64;
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > limits.max_bytes {
        return Err(UploadError::TooLarge {
            size,
            limit: limits.max_bytes,
        });
    }

    match UploadKind::from_file_name(&upload.file_name) {
        UploadKind::LegacyHwp => Err(UploadError::LegacyHwp),
        UploadKind::Other(_) => Ok(Prepared::Raw(&upload.bytes)),
        UploadKind::Hwpx => {
            let text = extract_hwpx_text(&upload.bytes).map_err(UploadError::Unprocessable)?;
            let (text, chars, truncated) = truncate_chars(text, limits.max_chars);
            if truncated {
                tracing::info!(chars, limit = limits.max_chars, "extracted text truncated");
            }
            Ok(Prepared::Text {
                text,
                chars,
                truncated,
            })
        }
    }
}

/// Cut `text` to at most `max` characters.
fn truncate_chars(mut text: String, max: usize) -> (String, usize, bool) {
    let chars = text.chars().count();
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            text.truncate(cut);
            (text, chars, true)
        }
        None => (text, chars, false),
    }
}

/// JSON response envelope `{ok, error?, ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Upload limit, reported alongside a 413
    #[serde(rename = "maxBytes", skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
    pub file: &'a str,
    pub kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
}

impl<'a> Envelope<'a> {
    pub fn new(
        upload: &'a Upload,
        kind: &'a UploadKind,
        result: &'a Result<Prepared<'a>, UploadError>,
    ) -> Self {
        let mut envelope = Self {
            ok: result.is_ok(),
            error: None,
            status: None,
            max_bytes: None,
            file: &upload.file_name,
            kind: kind.as_str(),
            text: None,
            chars: None,
            truncated: None,
            bytes: None,
        };

        match result {
            Ok(Prepared::Text {
                text,
                chars,
                truncated,
            }) => {
                envelope.text = Some(text.as_str());
                envelope.chars = Some(*chars);
                envelope.truncated = Some(*truncated);
            }
            Ok(Prepared::Raw(bytes)) => envelope.bytes = Some(bytes.len()),
            Err(e) => {
                envelope.error = Some(e.to_string());
                envelope.status = Some(e.status());
                if let UploadError::TooLarge { limit, .. } = e {
                    envelope.max_bytes = Some(*limit);
                }
            }
        }

        envelope
    }

    /// Pretty-printed JSON with two-space indentation
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
