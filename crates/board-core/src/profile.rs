//! Profile image selected for upload.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{BoardResult, ValidationError};

const SUPPORTED_IMAGE_MIMES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Image bytes plus what the upload needs to describe them.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ProfileImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileImage")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ProfileImage {
    /// Wraps in-memory bytes. The MIME type comes from the content
    /// (magic bytes), falling back to the file extension.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> BoardResult<Self> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(ValidationError::UnsupportedImage(format!("{file_name} is empty")).into());
        }
        let mime = detect_image_mime(&bytes)
            .or_else(|| mime_type_for_extension(&file_name).map(str::to_string))
            .ok_or_else(|| {
                ValidationError::UnsupportedImage(format!(
                    "{file_name} is not a PNG, JPEG, GIF or WebP image"
                ))
            })?;
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    /// Reads an image from disk.
    pub async fn load(path: &Path) -> BoardResult<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ValidationError::UnsupportedImage(format!("cannot read {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "profile".to_string(), |n| n.to_string_lossy().into_owned());
        Self::from_bytes(file_name, bytes)
    }

    /// `data:` URL usable as an inline preview.
    pub fn preview_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn detect_image_mime(bytes: &[u8]) -> Option<String> {
    let kind = infer::get(bytes)?;
    let mime = kind.mime_type();
    if SUPPORTED_IMAGE_MIMES.contains(&mime) {
        Some(mime.to_string())
    } else {
        None
    }
}

fn mime_type_for_extension(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension().and_then(|e| e.to_str())?;

    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
