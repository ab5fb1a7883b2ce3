/// Site content entries (texts and images shown on the storefront)
use super::Entity;
use crate::error::{AdminError, AdminResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use validator::Validate;

/// Key suffixes marking image-valued entries
const IMAGE_KEY_SUFFIXES: [&str; 2] = ["_url", "_image"];

/// Content entry, identified by its key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub key: String,
    /// Text, or the stored image reference for image keys
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for ContentEntry {
    type Id = String;

    fn id(&self) -> &String {
        &self.key
    }
}

impl ContentEntry {
    pub fn is_image(&self) -> bool {
        is_image_key(&self.key)
    }
}

/// Whether a key names an image-valued entry
pub fn is_image_key(key: &str) -> bool {
    IMAGE_KEY_SUFFIXES.iter().any(|suffix| key.ends_with(suffix))
}

/// New content entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewContent {
    #[validate(length(min = 1, message = "key is required"))]
    pub key: String,
    pub value: String,
}

/// A file held locally until it is uploaded
#[derive(Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl FileUpload {
    /// Wrap raw bytes, rejecting anything that is not a recognised image
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> AdminResult<Self> {
        let file_name = file_name.into();
        let format = image::guess_format(&bytes).map_err(|_| {
            AdminError::Validation(format!("{} is not a supported image", file_name))
        })?;

        Ok(Self {
            file_name,
            mime_type: format.to_mime_type().to_string(),
            bytes,
        })
    }

    /// Read an image from disk
    pub async fn from_path(path: &Path) -> AdminResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Self::from_bytes(file_name, bytes)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Replacement for a content entry's value
#[derive(Debug, Clone, PartialEq)]
pub enum ContentUpdate {
    Text(String),
    File(FileUpload),
}

impl ContentUpdate {
    /// Check the update fits the key it targets
    pub fn check_key(&self, key: &str) -> AdminResult<()> {
        match self {
            ContentUpdate::File(upload) if !is_image_key(key) => Err(AdminError::Validation(format!(
                "{} cannot receive file {}: only *_url and *_image keys hold images",
                key, upload.file_name
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Smallest valid PNG signature plus IHDR chunk header
    pub const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];
}
