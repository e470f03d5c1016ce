//! Per-session state: the selected images, the prompt and what is shown.
//!
//! A [`Session`] is created when the tool starts and is handed to every
//! handler explicitly. Nothing here performs I/O except [`Session::export`];
//! the asynchronous handlers live on [`crate::Orchestrator`].

use crate::error::{FuseError, Result};
use crate::image::{EncodedImage, GeneratedImage, DOWNLOAD_FILE_NAME};
use std::path::{Path, PathBuf};

/// The style reference currently picked from the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedReference {
    /// Gallery index of the preset.
    pub index: usize,
    /// The fetched reference image.
    pub image: EncodedImage,
}

/// What the result area currently shows.
#[derive(Debug, Clone, Default)]
pub enum ResultView {
    /// Nothing yet, or cleared by a new attempt.
    #[default]
    Empty,
    /// A generated image, available for download.
    Image(GeneratedImage),
    /// A failed attempt's message.
    Error(String),
}

impl ResultView {
    /// The displayed image, if any.
    pub fn image(&self) -> Option<&GeneratedImage> {
        match self {
            Self::Image(image) => Some(image),
            _ => None,
        }
    }

    /// The displayed error, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Which controls are usable right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// The generate trigger.
    pub generate_enabled: bool,
    /// The prompt input.
    pub prompt_enabled: bool,
    /// The download action.
    pub download_enabled: bool,
}

/// State of one user session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    subject: Option<EncodedImage>,
    reference: Option<SelectedReference>,
    prompt: String,
    busy: bool,
    view: ResultView,
    setup_error: Option<String>,
}

impl Session {
    /// A fresh, enabled session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose service could not be initialized.
    ///
    /// Generation and prompt input stay disabled for its whole lifetime.
    pub fn failed_setup(message: impl Into<String>) -> Self {
        Self {
            setup_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// The selected subject photo.
    pub fn subject(&self) -> Option<&EncodedImage> {
        self.subject.as_ref()
    }

    /// Replaces the subject photo.
    pub fn set_subject(&mut self, image: EncodedImage) {
        self.subject = Some(image);
    }

    /// Removes the subject photo.
    pub fn remove_subject(&mut self) {
        self.subject = None;
    }

    /// The selected style reference.
    pub fn reference(&self) -> Option<&SelectedReference> {
        self.reference.as_ref()
    }

    pub(crate) fn set_reference(&mut self, reference: SelectedReference) {
        self.reference = Some(reference);
    }

    /// Deselects the style reference.
    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    /// The prompt as typed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Replaces the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// True while a generation request is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The result area.
    pub fn view(&self) -> &ResultView {
        &self.view
    }

    /// Why the service could not be set up, if it could not.
    pub fn setup_error(&self) -> Option<&str> {
        self.setup_error.as_deref()
    }

    /// Current control state.
    pub fn controls(&self) -> Controls {
        let usable = self.setup_error.is_none() && !self.busy;
        Controls {
            generate_enabled: usable && self.subject.is_some(),
            prompt_enabled: usable,
            download_enabled: self.view.image().is_some(),
        }
    }

    /// Enters the busy state, hiding any previous result or error.
    ///
    /// Busy is cleared when the returned guard is dropped.
    pub(crate) fn begin_attempt(&mut self) -> AttemptGuard<'_> {
        self.busy = true;
        self.view = ResultView::Empty;
        AttemptGuard { session: self }
    }

    /// Writes the displayed result into `dir` as `fused-image.png`.
    pub fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let image = self
            .view
            .image()
            .ok_or_else(|| FuseError::InvalidRequest("no generated image to download".into()))?;
        let path = dir.as_ref().join(DOWNLOAD_FILE_NAME);
        image.save(&path)?;
        tracing::info!(path = %path.display(), bytes = image.size(), "saved generated image");
        Ok(path)
    }
}

/// Holds a session in the busy state for the duration of one attempt.
pub(crate) struct AttemptGuard<'a> {
    session: &'a mut Session,
}

impl AttemptGuard<'_> {
    pub(crate) fn show_image(self, image: GeneratedImage) {
        self.session.view = ResultView::Image(image);
    }

    pub(crate) fn show_error(self, message: String) {
        self.session.view = ResultView::Error(message);
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        self.session.busy = false;
    }
}
