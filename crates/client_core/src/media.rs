//! Image payload handling: local file intake, data-URI normalization and download naming.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use shared::domain::HistoryId;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";
const DATA_URI_SCHEME: &str = "data:";

/// Multipart file name the backend receives for every upload.
pub const UPLOAD_FILE_NAME: &str = "upload.png";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("not a base64 data URI")]
    MalformedDataUri,
    #[error("invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// A file as picked by the user, before the workflow decides whether to accept it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing its media type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, MediaError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| MediaError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UPLOAD_FILE_NAME.to_string());
        Ok(Self {
            file_name,
            media_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.media_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

/// An accepted upload: the raw payload plus its displayable data-URI form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    file_name: String,
    media_type: String,
    bytes: Vec<u8>,
    preview: String,
}

impl UploadedImage {
    /// Returns `None` for anything whose media type is not `image/*`.
    pub fn decode(file: SelectedFile) -> Option<Self> {
        if !file.is_image() {
            return None;
        }
        let preview = format!(
            "{DATA_URI_SCHEME}{};base64,{}",
            file.media_type,
            STANDARD.encode(&file.bytes)
        );
        Some(Self {
            file_name: file.file_name,
            media_type: file.media_type,
            bytes: file.bytes,
            preview,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }
}

/// Makes a backend image value directly displayable. Values that already carry a data-URI
/// prefix pass through untouched; raw base64 gets a PNG prefix. Idempotent.
pub fn normalize_image_payload(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if value.trim_start().starts_with(DATA_URI_SCHEME) {
        return value.to_string();
    }
    format!("{PNG_DATA_URI_PREFIX}{value}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Decodes a normalized (or raw base64) image value back into bytes for saving.
pub fn decode_image_payload(value: &str) -> Result<DecodedImage, MediaError> {
    let normalized = normalize_image_payload(value);
    let uri = normalized.trim();
    let rest = uri
        .strip_prefix(DATA_URI_SCHEME)
        .ok_or(MediaError::MalformedDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(MediaError::MalformedDataUri)?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or(MediaError::MalformedDataUri)?;
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(DecodedImage {
        media_type: if media_type.is_empty() {
            "image/png".to_string()
        } else {
            media_type.to_string()
        },
        bytes,
    })
}

/// `dreamink-<title>.png`, with the title lowercased and whitespace runs collapsed to `-`.
pub fn result_file_name(style_title: &str) -> String {
    let mut slug = String::with_capacity(style_title.len());
    let mut in_whitespace = false;
    for ch in style_title.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(ch);
            in_whitespace = false;
        }
    }
    format!("dreamink-{slug}.png")
}

pub fn history_file_name(style: &str, id: HistoryId) -> String {
    format!("ai-transform-{style}-{id}.png")
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;
