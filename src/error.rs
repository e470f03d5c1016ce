//! Error types for style fusion.

use std::time::Duration;

/// Longest service error body echoed back to the user.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Input problems caught before any network call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No subject photo has been selected.
    #[error("please upload a photo first")]
    MissingSubject,

    /// Neither a style reference nor a prompt was given.
    #[error("please select a style or enter a prompt")]
    MissingStyle,
}

/// Errors that can occur while preparing or running a fusion.
#[derive(Debug, thiserror::Error)]
pub enum FuseError {
    /// Submission rejected before reaching the service.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The generation service could not be initialized for this session.
    #[error("setup failed: {0}")]
    Setup(String),

    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The call succeeded but no image part came back.
    #[error("the model did not return an image, try a different prompt or style")]
    NoImage,

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading the subject or saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FuseError {
    /// Returns true for errors raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for fusion operations.
pub type Result<T> = std::result::Result<T, FuseError>;

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(wait) => format!(", retry after {}s", wait.as_secs()),
        None => String::new(),
    }
}

/// Reads a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Collapses whitespace and truncates a service error body for display.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    truncated.push_str("...");
    truncated
}
