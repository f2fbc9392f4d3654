//! Drafts of the editable fields of each entity
//!
//! A draft is validated locally before anything is sent; the API clients
//! call [`Validate::validate`](crate::validation::Validate) themselves, so
//! an invalid draft never reaches the network.

mod account;
mod artwork;
mod comment;
mod event;
mod reservation;
mod workshop;

use std::path::Path;

use bytes::Bytes;
use chrono::NaiveDateTime;
use reqwest::multipart::Part;

use crate::error::Result;
use crate::validation::{FieldErrors, MAX_IMAGE_BYTES};

pub use account::*;
pub use artwork::*;
pub use comment::*;
pub use event::*;
pub use reservation::*;
pub use workshop::*;

/// Wire format of dates sent in forms
pub(crate) const FORM_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) fn format_datetime(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format(FORM_DATETIME).to_string())
        .unwrap_or_default()
}

/// An image file attached to a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: &str, mime: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, detecting its type from the content
    ///
    /// Formats without a binary signature (SVG) fall back to the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = detect_mime(path, &bytes);
        Ok(Self::new(&file_name, mime, bytes))
    }

    pub(crate) fn check(&self, errors: &mut FieldErrors, field: &str) {
        if !self.mime.starts_with("image/") {
            errors.add(field, "Select a valid image file.");
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            errors.add(field, "The image must not exceed 5 MB.");
        }
    }

    pub(crate) fn to_part(&self) -> Result<Part> {
        Ok(Part::bytes(self.bytes.to_vec())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)?)
    }
}

fn detect_mime(path: &Path, bytes: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() == infer::MatcherType::Image || !is_svg(path, bytes) {
            return kind.mime_type();
        }
    }
    if is_svg(path, bytes) {
        "image/svg+xml"
    } else {
        "application/octet-stream"
    }
}

fn is_svg(path: &Path, bytes: &[u8]) -> bool {
    let svg_extension = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("svg"));
    let head = &bytes[..bytes.len().min(1024)];
    svg_extension && String::from_utf8_lossy(head).contains("<svg")
}
