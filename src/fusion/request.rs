//! Assembly of the multi-part generation request.

use crate::error::{Result, ValidationError};
use crate::image::EncodedImage;

/// Instruction sent when a style reference is chosen but no prompt typed.
pub const DEFAULT_STYLE_INSTRUCTION: &str = "Redraw the subject of the first image in the \
artistic style of the second image. Keep the subject, pose and composition of the first \
image recognizable while adopting the colors, brushwork and mood of the second.";

/// One unit of a multi-modal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Inline image data with its media type.
    InlineImage(EncodedImage),
    /// Plain text.
    Text(String),
}

impl Part {
    /// Returns the image if this is an image part.
    pub fn as_image(&self) -> Option<&EncodedImage> {
        match self {
            Self::InlineImage(image) => Some(image),
            Self::Text(_) => None,
        }
    }

    /// Returns the text if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::InlineImage(_) => None,
        }
    }
}

/// An ordered list of parts sent to the generation service.
///
/// Always holds the subject image first and ends with exactly one
/// non-empty text part; the style reference, when selected, sits in
/// between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    parts: Vec<Part>,
}

impl GenerationRequest {
    /// Validates the inputs and builds the request.
    ///
    /// A blank prompt is replaced by [`DEFAULT_STYLE_INSTRUCTION`] when a
    /// reference is present. Without a reference a prompt is required.
    pub fn assemble(
        subject: Option<&EncodedImage>,
        reference: Option<&EncodedImage>,
        prompt: &str,
    ) -> Result<Self> {
        let subject = subject.ok_or(ValidationError::MissingSubject)?;
        let prompt = prompt.trim();

        let text = match (reference, prompt.is_empty()) {
            (None, true) => return Err(ValidationError::MissingStyle.into()),
            (Some(_), true) => DEFAULT_STYLE_INSTRUCTION.to_string(),
            (_, false) => prompt.to_string(),
        };

        let mut parts = Vec::with_capacity(3);
        parts.push(Part::InlineImage(subject.clone()));
        if let Some(reference) = reference {
            parts.push(Part::InlineImage(reference.clone()));
        }
        parts.push(Part::Text(text));

        Ok(Self { parts })
    }

    /// The parts in send order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Number of image parts.
    pub fn image_count(&self) -> usize {
        self.parts.iter().filter(|p| p.as_image().is_some()).count()
    }

    /// The instruction text sent with the images.
    pub fn text(&self) -> &str {
        self.parts
            .iter()
            .find_map(Part::as_text)
            .unwrap_or_default()
    }
}
