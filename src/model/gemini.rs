use super::{GenerationRequest, GenerativeModel, ModelError};
use crate::config::ModelConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for the Generative Language `generateContent` endpoint.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        Self::new(&config.endpoint, &config.name, Duration::from_secs(config.timeout_secs))
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        let body = GenerateContentRequest::from(request);
        debug!(model = %self.model, prompt_len = request.prompt.len(), "calling generateContent");

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &request.credential)
            .json(&body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        interpret_reply(status, &text)
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    parts: Vec<OutgoingPart<'a>>,
}

#[derive(Serialize, Debug)]
struct OutgoingPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl<'a> From<&'a GenerationRequest> for GenerateContentRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            contents: vec![Content { parts: vec![OutgoingPart { text: &request.prompt }] }],
            generation_config: GenerationConfig {
                temperature: request.params.temperature,
                max_output_tokens: request.params.max_output_tokens,
                response_mime_type: request.params.structured_output.then_some("application/json"),
            },
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<IncomingPart>,
}

#[derive(Deserialize, Debug)]
struct IncomingPart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Maps an HTTP status and body to the reply text or a uniform error.
pub fn interpret_reply(status: u16, body: &str) -> Result<String, ModelError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<GenerateContentResponse>(body)
            .ok()
            .and_then(|reply| reply.error)
            .map(|error| error.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| body.trim().to_string());
        return Err(ModelError::Http { status, message });
    }

    let reply: GenerateContentResponse = serde_json::from_str(body)?;
    if let Some(error) = reply.error {
        let message = if error.message.trim().is_empty() { "API Error".to_string() } else { error.message };
        return Err(ModelError::Api(message));
    }

    let candidate = reply.candidates.into_iter().next().ok_or(ModelError::EmptyCandidates)?;
    let texts: Vec<String> = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();
    if texts.is_empty() {
        return Err(ModelError::MissingText);
    }
    Ok(texts.concat())
}
