//! Reads meal photos from disk and encodes them for analysis and storage.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// A photo ready to send to the analysis service.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPhoto {
    pub mime_type: &'static str,
    pub base64: String,
}

impl EncodedPhoto {
    pub fn from_bytes(bytes: &[u8], mime_type: &'static str) -> Self {
        Self {
            mime_type,
            base64: STANDARD.encode(bytes),
        }
    }

    /// Reads `path`, inferring the MIME type from its extension.
    pub async fn read(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mime_type = mime_from_extension(path)
            .ok_or_else(|| format!("Unsupported image type: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Ok(Self::from_bytes(&bytes, mime_type))
    }

    /// The form stored on a meal's `photo` field.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("a.png")), Some("image/png"));
        assert_eq!(mime_from_extension(Path::new("a.gif")), None);
        assert_eq!(mime_from_extension(Path::new("noext")), None);
    }

    #[test]
    fn test_data_url() {
        let photo = EncodedPhoto::from_bytes(b"abc", "image/png");
        assert_eq!(photo.base64, "YWJj");
        assert_eq!(photo.data_url(), "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn test_read_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meal.txt");
        std::fs::write(&path, b"x").unwrap();
        assert!(EncodedPhoto::read(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_read_encodes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meal.jpeg");
        std::fs::write(&path, b"abc").unwrap();
        let photo = EncodedPhoto::read(&path).await.unwrap();
        assert_eq!(photo.mime_type, "image/jpeg");
        assert_eq!(photo.base64, "YWJj");
    }
}
