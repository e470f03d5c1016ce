//! Gemini (Google) generation service.

use crate::error::{parse_retry_after, sanitize_error_message, FuseError, Result};
use crate::fusion::request::{GenerationRequest, Part};
use crate::fusion::response::{Candidate, GenerationResponse, ResponsePart};
use crate::fusion::service::FusionService;
use crate::image::EncodedImage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "gemini-3-pro-image-preview",
        }
    }
}

/// Builder for GeminiService.
#[derive(Debug, Clone, Default)]
pub struct GeminiServiceBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl GeminiServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = Some(model.as_str().to_string());
        self
    }

    /// Sets a raw model identifier, for models without a [`GeminiModel`] variant.
    pub fn model_id(mut self, id: impl Into<String>) -> Self {
        self.model = Some(id.into());
        self
    }

    /// Overrides the API base URL (e.g. a gateway).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the service, resolving the API key.
    ///
    /// Failure here is a setup error: the session cannot generate at all.
    pub fn build(self) -> Result<GeminiService> {
        let api_key = resolve_api_key(self.api_key, |var| std::env::var(var).ok())
            .ok_or_else(|| {
                FuseError::Auth(
                    "GEMINI_API_KEY / GOOGLE_API_KEY not set and no API key provided".into(),
                )
            })?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("stylefuse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FuseError::Setup(format!("failed to build HTTP client: {e}")))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiService {
            client,
            api_key,
            model: self
                .model
                .unwrap_or_else(|| GeminiModel::default().as_str().to_string()),
            base_url,
        })
    }
}

/// Picks the API key: an explicit key wins, otherwise the first non-blank
/// variable in [`API_KEY_ENV_VARS`]. A blank explicit key is not replaced.
fn resolve_api_key(
    explicit: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let usable = |key: &String| !key.trim().is_empty();
    match explicit {
        Some(key) => Some(key).filter(usable),
        None => API_KEY_ENV_VARS
            .iter()
            .find_map(|var| env(*var).filter(usable)),
    }
}

/// Gemini `generateContent` client.
pub struct GeminiService {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiService {
    /// Creates a new `GeminiServiceBuilder`.
    pub fn builder() -> GeminiServiceBuilder {
        GeminiServiceBuilder::new()
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model)
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> FuseError {
        let text = sanitize_error_message(text);
        if status == 404 {
            return FuseError::InvalidRequest(format!(
                "model '{}' not found. Verify the model name is correct.",
                self.model
            ));
        }
        if status == 429 {
            let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
            return FuseError::RateLimited { retry_after };
        }
        if status == 401 || status == 403 {
            return FuseError::Auth(text);
        }
        let lower = text.to_lowercase();
        if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited") {
            return FuseError::ContentBlocked(text);
        }
        FuseError::Api {
            status,
            message: text,
        }
    }
}

#[async_trait]
impl FusionService for GeminiService {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url());
        let body = GeminiRequest::from_generation_request(request);

        tracing::debug!(
            model = %self.model,
            parts = request.parts().len(),
            images = request.image_count(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        // Blocks are reported with HTTP 200
        if let Some(ref feedback) = gemini_response.prompt_feedback {
            if let Some(ref reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .clone()
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(FuseError::ContentBlocked(msg));
            }
        }

        if let Some(reason) = gemini_response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            if is_safety_finish(reason) {
                return Err(FuseError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {}",
                    reason
                )));
            }
        }

        tracing::debug!(
            candidates = gemini_response.candidates.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generateContent response received"
        );

        Ok(gemini_response.into_generation_response())
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(FuseError::Auth("Invalid API key".into())),
            404 => Err(FuseError::InvalidRequest(format!(
                "model '{}' not found. Verify the model name is correct.",
                self.model
            ))),
            s if !(200..300).contains(&s) => Err(FuseError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

fn is_safety_finish(reason: &str) -> bool {
    matches!(
        reason,
        "SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "IMAGE_RECITATION"
            | "RECITATION"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST"
            | "SPII"
    )
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        let parts = req
            .parts()
            .iter()
            .map(|part| match part {
                Part::InlineImage(image) => GeminiRequestPart::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                },
                Part::Text(text) => GeminiRequestPart::Text { text: text.clone() },
            })
            .collect();

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GeminiResponse {
    fn into_generation_response(self) -> GenerationResponse {
        let candidates = self
            .candidates
            .into_iter()
            .map(|c| Candidate {
                parts: c
                    .content
                    .map(|content| content.parts)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(GeminiPartResponse::into_part)
                    .collect(),
                finish_reason: c.finish_reason,
            })
            .collect();
        GenerationResponse { candidates }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
    /// Set on intermediate "thinking" output of some image models.
    #[serde(default)]
    thought: bool,
}

impl GeminiPartResponse {
    fn into_part(self) -> Option<ResponsePart> {
        if let Some(inline) = self.inline_data {
            return Some(ResponsePart::Image(EncodedImage {
                data: inline.data,
                mime_type: inline.mime_type,
            }));
        }
        self.text.map(ResponsePart::Text)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}
