//! Generation service trait.

use crate::error::Result;
use crate::fusion::request::GenerationRequest;
use crate::fusion::response::GenerationResponse;
use async_trait::async_trait;

/// A generative service that accepts multi-part requests.
#[async_trait]
pub trait FusionService: Send + Sync {
    /// Sends one request and returns the raw candidates.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// The model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
