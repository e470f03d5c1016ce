//! Loading remote images, used for the preset style references.

use crate::error::{FuseError, Result};
use crate::image::types::{EncodedImage, ImageFormat};
use async_trait::async_trait;

/// Something that can turn a URL into an encoded image.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetches and encodes the image at `url`.
    async fn fetch(&self, url: &str) -> Result<EncodedImage>;
}

/// Fetches images over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    /// Creates a source with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<EncodedImage> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FuseError::Api {
                status: status.as_u16(),
                message: format!("failed to fetch reference image from {url}"),
            });
        }

        let declared = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase());

        let bytes = response.bytes().await?;
        tracing::debug!(url, bytes = bytes.len(), content_type = ?declared, "fetched reference image");

        match declared {
            Some(mime) if mime.starts_with("image/") => EncodedImage::from_bytes(&bytes, mime),
            // Servers commonly label images as octet-stream; trust the bytes then.
            Some(mime) if mime != "application/octet-stream" => {
                Err(FuseError::InvalidRequest(format!(
                    "reference at {url} is not an image (content type '{mime}')"
                )))
            }
            _ => {
                let format = ImageFormat::from_magic_bytes(&bytes).ok_or_else(|| {
                    FuseError::InvalidRequest(format!("reference at {url} is not an image"))
                })?;
                EncodedImage::from_bytes(&bytes, format.mime_type())
            }
        }
    }
}
