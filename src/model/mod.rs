pub mod gemini;

pub use gemini::GeminiClient;

use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Ask the service to constrain its reply to JSON.
    pub structured_output: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { temperature: 0.1, max_output_tokens: 8192, structured_output: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub credential: String,
    pub params: GenerationParams,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model service returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("model service error: {0}")]
    Api(String),
    #[error("API returned empty candidates.")]
    EmptyCandidates,
    #[error("API returned a candidate without text.")]
    MissingText,
    #[error("could not decode model service reply: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The external text-generation collaborator: prompt in, raw reply text out.
pub trait GenerativeModel: Send + Sync {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, ModelError>> + Send;
}
