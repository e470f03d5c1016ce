//! Service-neutral view of a generation response.

use crate::image::EncodedImage;

/// One unit of a response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    /// Inline image data.
    Image(EncodedImage),
    /// Plain text.
    Text(String),
}

/// One alternative output returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// Parts in the order the service returned them.
    pub parts: Vec<ResponsePart>,
    /// Why generation stopped, as reported by the service.
    pub finish_reason: Option<String>,
}

/// The candidates returned for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Candidates in service order.
    pub candidates: Vec<Candidate>,
}

impl GenerationResponse {
    /// The first image part of the first candidate.
    ///
    /// Other candidates and any later image parts are ignored.
    pub fn first_image(&self) -> Option<&EncodedImage> {
        self.candidates.first()?.parts.iter().find_map(|p| match p {
            ResponsePart::Image(image) => Some(image),
            ResponsePart::Text(_) => None,
        })
    }

    /// The first text part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates.first()?.parts.iter().find_map(|p| match p {
            ResponsePart::Text(text) => Some(text.as_str()),
            ResponsePart::Image(_) => None,
        })
    }
}
