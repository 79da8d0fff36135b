use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Media type used when the content cannot be recognized.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// A file selected for upload, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    /// The file name sent in the multipart part.
    pub file_name: String,
    /// The declared media type, e.g. `image/jpeg`.
    pub content_type: String,
    /// The raw content.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk and sniffs its media type from the content.
    ///
    /// # Arguments
    ///
    /// * `path` - The path of the file.
    ///
    /// # Returns
    ///
    /// A `Result` containing the loaded `UploadFile`.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::Validation(format!("Not a file: {}", path.display())))?;
        let content_type = sniff_media_type(&bytes);

        tracing::debug!(
            "📄 Loaded {} ({} bytes, {})",
            file_name,
            bytes.len(),
            content_type
        );

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Returns the media type recognized from the magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> String {
    infer::get(bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| UNKNOWN_MEDIA_TYPE.to_string())
}

/// One stored file as returned by the batch upload endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedFile {
    pub id: i64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}
