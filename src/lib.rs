#![warn(missing_docs)]
//! stylefuse - fuse a subject photo with a style reference using Gemini.
//!
//! A session holds at most one subject photo, at most one style reference
//! picked from a preset [`Gallery`], and a free-text prompt. Submitting
//! sends them as one multi-part request to the generation service and
//! shows the first image that comes back.
//!
//! # Quick Start
//!
//! ```no_run
//! use stylefuse::{Gallery, GeminiService, HttpImageSource, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> stylefuse::Result<()> {
//!     let (orchestrator, mut session) = Orchestrator::start(
//!         GeminiService::builder().build(),
//!         HttpImageSource::new(),
//!         Gallery::builtin(),
//!     );
//!
//!     orchestrator.load_subject(&mut session, "portrait.jpg").await?;
//!     orchestrator.toggle_reference(&mut session, 0).await?;
//!     orchestrator.submit(&mut session).await?;
//!     session.export(".")?;
//!     Ok(())
//! }
//! ```
//!
//! # Rules
//!
//! - A subject photo is required, and so is a style signal: a selected
//!   reference, a non-blank prompt, or both. Otherwise submit fails with a
//!   [`ValidationError`] and nothing is sent.
//! - With a reference but no prompt, [`DEFAULT_STYLE_INSTRUCTION`] is sent.
//! - Parts are sent as subject, reference, text.
//! - Only the first candidate's first image is used.
//!
//! # Features
//!
//! - `cli` (default): the `stylefuse` command-line tool.

mod error;
pub mod fusion;
pub mod gallery;
pub mod image;
mod orchestrator;
pub mod session;

// Re-export error types at crate root
pub use error::{FuseError, Result, ValidationError};

pub use fusion::{
    FusionService, GeminiModel, GeminiService, GeminiServiceBuilder, GenerationRequest,
    GenerationResponse, Part, DEFAULT_STYLE_INSTRUCTION,
};
pub use gallery::{Gallery, StylePreset};
pub use image::{
    EncodedImage, GeneratedImage, HttpImageSource, ImageFormat, ImageSource, DOWNLOAD_FILE_NAME,
};
pub use orchestrator::{Orchestrator, ReferenceToggle};
pub use session::{Controls, ResultView, Session};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{FuseError, Result};
    pub use crate::fusion::{FusionService, GeminiService};
    pub use crate::gallery::Gallery;
    pub use crate::image::{HttpImageSource, ImageSource};
    pub use crate::orchestrator::Orchestrator;
    pub use crate::session::Session;
}
