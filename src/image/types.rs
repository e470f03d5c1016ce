//! Core image types: encoded inputs and generated outputs.

use crate::error::{FuseError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name used when exporting the displayed result.
pub const DOWNLOAD_FILE_NAME: &str = "fused-image.png";

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Maps a MIME type (parameters ignored) to a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Image bytes carried as base64 text plus their declared media type.
///
/// This is the shape every image takes on its way to the service: the
/// uploaded subject, a fetched style reference, or an image part in a
/// response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    /// Standard base64 of the image bytes.
    pub data: String,
    /// Declared media type, e.g. `image/jpeg`.
    pub mime_type: String,
}

impl EncodedImage {
    /// Encodes raw bytes with the given media type.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Result<Self> {
        let mime_type = mime_type.into();
        if bytes.is_empty() {
            return Err(FuseError::InvalidRequest("image is empty".into()));
        }
        if !mime_type.trim().to_lowercase().starts_with("image/") {
            return Err(FuseError::InvalidRequest(format!(
                "expected an image, got media type '{mime_type}'"
            )));
        }
        Ok(Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type,
        })
    }

    /// Encodes bytes whose media type is sniffed from their magic bytes.
    pub fn sniff(bytes: &[u8]) -> Result<Self> {
        let format = ImageFormat::from_magic_bytes(bytes)
            .ok_or_else(|| FuseError::InvalidRequest("unrecognized image format".into()))?;
        Self::from_bytes(bytes, format.mime_type())
    }

    /// Reads and encodes an image file.
    ///
    /// The media type comes from the file's magic bytes. The extension is
    /// only a label: a file whose contents are not a known image format is
    /// rejected whatever it is named.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;

        let format = ImageFormat::from_magic_bytes(&bytes).ok_or_else(|| {
            FuseError::InvalidRequest(format!(
                "{} is not a PNG, JPEG or WebP image",
                path.display()
            ))
        })?;

        let claimed = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension);
        if claimed.is_some_and(|claimed| claimed != format) {
            tracing::debug!(
                path = %path.display(),
                detected = format.mime_type(),
                "file extension does not match contents"
            );
        }

        Self::from_bytes(&bytes, format.mime_type())
    }

    /// Decodes the base64 payload back into bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| FuseError::Decode(e.to_string()))
    }

    /// Approximate size of the decoded payload in bytes.
    pub fn decoded_len(&self) -> usize {
        self.data.len() / 4 * 3
    }
}

// Keep base64 payloads out of logs and panic messages.
impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Text the model returned alongside the image, if any.
    pub text: Option<String>,
}

/// A generated image with its data and metadata.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or processed"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Decodes an image part returned by the service.
    ///
    /// The declared media type wins; unknown types are sniffed and finally
    /// default to PNG.
    pub fn from_encoded(image: &EncodedImage, metadata: GenerationMetadata) -> Result<Self> {
        let data = image.decode()?;
        let format = ImageFormat::from_mime_type(&image.mime_type)
            .or_else(|| ImageFormat::from_magic_bytes(&data))
            .unwrap_or_default();
        Ok(Self {
            data,
            format,
            metadata,
        })
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            self.to_base64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn test_format_from_mime_type() {
        assert_eq!(
            ImageFormat::from_mime_type("image/jpeg"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_mime_type("IMAGE/PNG; charset=binary"),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_mime_type("text/html"), None);
    }

    #[test]
    fn test_encoded_image_from_bytes() {
        let image = EncodedImage::from_bytes(&PNG_MAGIC, "image/png").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.decode().unwrap(), PNG_MAGIC.to_vec());
    }

    #[test]
    fn test_encoded_image_rejects_empty_and_non_image() {
        assert!(matches!(
            EncodedImage::from_bytes(&[], "image/png"),
            Err(FuseError::InvalidRequest(_))
        ));
        assert!(matches!(
            EncodedImage::from_bytes(b"<html>", "text/html"),
            Err(FuseError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_encoded_image_sniff() {
        let image = EncodedImage::sniff(&JPEG_MAGIC).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert!(EncodedImage::sniff(b"not an image").is_err());
    }

    #[test]
    fn test_debug_hides_payload() {
        let image = EncodedImage::from_bytes(&PNG_MAGIC, "image/png").unwrap();
        let debug = format!("{image:?}");
        assert!(!debug.contains(&image.data));
        assert!(debug.contains("image/png"));
    }

    #[tokio::test]
    async fn test_from_file_detects_format_from_contents() {
        let dir = tempfile::tempdir().unwrap();

        let jpg = dir.path().join("photo.JPG");
        std::fs::write(&jpg, JPEG_MAGIC).unwrap();
        let image = EncodedImage::from_file(&jpg).await.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");

        let unknown = dir.path().join("upload.bin");
        std::fs::write(&unknown, PNG_MAGIC).unwrap();
        let image = EncodedImage::from_file(&unknown).await.unwrap();
        assert_eq!(image.mime_type, "image/png");

        let mislabeled = dir.path().join("really-a-png.jpg");
        std::fs::write(&mislabeled, PNG_MAGIC).unwrap();
        let image = EncodedImage::from_file(&mislabeled).await.unwrap();
        assert_eq!(image.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_from_file_rejects_non_image_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.png");
        std::fs::write(&path, "just some notes, not a picture").unwrap();

        let err = EncodedImage::from_file(&path).await.unwrap_err();
        assert!(matches!(err, FuseError::InvalidRequest(ref msg) if msg.contains("x.png")));
    }

    #[tokio::test]
    async fn test_from_file_missing() {
        let err = EncodedImage::from_file("/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, FuseError::Io(_)));
    }

    #[test]
    fn test_generated_image_from_encoded() {
        let encoded = EncodedImage::from_bytes(&WEBP_MAGIC, "image/webp").unwrap();
        let image = GeneratedImage::from_encoded(&encoded, GenerationMetadata::default()).unwrap();
        assert_eq!(image.format, ImageFormat::WebP);
        assert_eq!(image.size(), 12);
        assert!(image.to_data_url().starts_with("data:image/webp;base64,"));
    }

    #[test]
    fn test_generated_image_bad_base64() {
        let encoded = EncodedImage {
            data: "***".into(),
            mime_type: "image/png".into(),
        };
        assert!(matches!(
            GeneratedImage::from_encoded(&encoded, GenerationMetadata::default()),
            Err(FuseError::Decode(_))
        ));
    }
}
