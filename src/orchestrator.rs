//! The request orchestrator: turns user actions into one generation call.

use crate::error::{FuseError, Result};
use crate::fusion::{FusionService, GenerationRequest, GenerationResponse};
use crate::gallery::Gallery;
use crate::image::{EncodedImage, GeneratedImage, GenerationMetadata, ImageSource};
use crate::session::{SelectedReference, Session};
use std::path::Path;
use std::time::Instant;

/// Result of toggling a gallery preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceToggle {
    /// The preset was fetched and is now selected.
    Selected(usize),
    /// The preset was already selected and has been cleared.
    Deselected(usize),
}

/// Drives a [`Session`] against a generation service and an image source.
pub struct Orchestrator<S, F> {
    service: Option<S>,
    source: F,
    gallery: Gallery,
}

impl<S: FusionService, F: ImageSource> Orchestrator<S, F> {
    /// Starts a session from the outcome of service initialization.
    ///
    /// When initialization failed the returned session is disabled for
    /// good and every submit fails with [`FuseError::Setup`].
    pub fn start(service: Result<S>, source: F, gallery: Gallery) -> (Self, Session) {
        match service {
            Ok(service) => {
                tracing::info!(model = service.model(), presets = gallery.len(), "session started");
                let orchestrator = Self {
                    service: Some(service),
                    source,
                    gallery,
                };
                (orchestrator, Session::new())
            }
            Err(e) => {
                tracing::error!("generation service setup failed: {e}");
                let orchestrator = Self {
                    service: None,
                    source,
                    gallery,
                };
                (orchestrator, Session::failed_setup(e.to_string()))
            }
        }
    }

    /// The presets offered in this session.
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Reads a local file and makes it the subject photo.
    pub async fn load_subject(&self, session: &mut Session, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = EncodedImage::from_file(path).await?;
        tracing::debug!(
            path = %path.display(),
            mime_type = %image.mime_type,
            bytes = image.decoded_len(),
            "subject loaded"
        );
        session.set_subject(image);
        Ok(())
    }

    /// Selects the preset at `index`, or clears it if it is already selected.
    ///
    /// If fetching the preset fails the previous selection is kept.
    pub async fn toggle_reference(
        &self,
        session: &mut Session,
        index: usize,
    ) -> Result<ReferenceToggle> {
        if session.reference().map(|r| r.index) == Some(index) {
            session.clear_reference();
            tracing::debug!(index, "reference deselected");
            return Ok(ReferenceToggle::Deselected(index));
        }

        let preset = self.gallery.get(index).ok_or_else(|| {
            FuseError::InvalidRequest(format!(
                "no style preset at index {index} (gallery has {})",
                self.gallery.len()
            ))
        })?;

        let image = self.source.fetch(&preset.url).await?;
        tracing::debug!(index, name = %preset.name, "reference selected");
        session.set_reference(SelectedReference { index, image });
        Ok(ReferenceToggle::Selected(index))
    }

    /// Validates the session and runs one generation attempt.
    ///
    /// Validation failures return immediately without touching the session
    /// or the network. Otherwise the session is busy for the duration of
    /// the call and ends up showing either the image or an error message;
    /// the same error is also returned.
    pub async fn submit(&self, session: &mut Session) -> Result<()> {
        let service = match (&self.service, session.setup_error()) {
            (Some(service), None) => service,
            (_, Some(reason)) => return Err(FuseError::Setup(reason.to_string())),
            (None, None) => return Err(FuseError::Setup("no generation service".into())),
        };

        let request = GenerationRequest::assemble(
            session.subject(),
            session.reference().map(|r| &r.image),
            session.prompt(),
        )?;

        let attempt = session.begin_attempt();
        let start = Instant::now();

        let outcome = match service.generate(&request).await {
            Ok(response) => extract_image(&response, service.model(), start),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(image) => {
                tracing::info!(
                    bytes = image.size(),
                    format = image.format.extension(),
                    duration_ms = image.metadata.duration_ms,
                    "image generated"
                );
                attempt.show_image(image);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("generation failed: {e}");
                attempt.show_error(display_message(&e));
                Err(e)
            }
        }
    }
}

fn extract_image(
    response: &GenerationResponse,
    model: &str,
    start: Instant,
) -> Result<GeneratedImage> {
    let encoded = response.first_image().ok_or(FuseError::NoImage)?;
    GeneratedImage::from_encoded(
        encoded,
        GenerationMetadata {
            model: Some(model.to_string()),
            duration_ms: Some(start.elapsed().as_millis() as u64),
            text: response.first_text().map(str::to_string),
        },
    )
}

fn display_message(err: &FuseError) -> String {
    match err {
        FuseError::NoImage => err.to_string(),
        other => format!("Failed to generate image: {other}"),
    }
}
