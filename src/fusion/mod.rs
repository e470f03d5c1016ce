//! Request assembly, response parsing and the generation service.

mod gemini;
mod request;
mod response;
mod service;

pub use gemini::{
    GeminiModel, GeminiService, GeminiServiceBuilder, API_KEY_ENV_VARS, DEFAULT_BASE_URL,
};
pub use request::{GenerationRequest, Part, DEFAULT_STYLE_INSTRUCTION};
pub use response::{Candidate, GenerationResponse, ResponsePart};
pub use service::FusionService;
