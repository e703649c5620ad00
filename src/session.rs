use crate::annotate::segmenter::segment;
use crate::model::{GenerationParams, GenerationRequest, GenerativeModel, ModelError};
use crate::parsing::response_parser::{parse_lookup, parse_response, ParseError};
use crate::prompt::{build_lookup_prompt, build_prompt, build_route_prompt};
use crate::types::word_origin::{AnalysisResult, Segment, WordLookup, WordOrigin};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please enter some text to analyze.")]
    EmptyInput,
    #[error("Please add your Gemini API key in settings.")]
    MissingCredential,
    #[error("An analysis is already running.")]
    Busy,
    #[error("This analysis was superseded.")]
    Superseded,
    #[error("{0}")]
    AnalysisFailed(String),
}

impl From<ModelError> for SessionError {
    fn from(e: ModelError) -> Self {
        SessionError::AnalysisFailed(e.to_string())
    }
}

impl From<ParseError> for SessionError {
    fn from(e: ParseError) -> Self {
        SessionError::AnalysisFailed(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Analyzing { text: String },
    Ready { text: String, result: AnalysisResult, segments: Vec<Segment> },
    Failed { text: String, message: String },
}

/// An analysis that has been accepted and is waiting for the model reply.
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    run: u64,
    text: String,
    request: GenerationRequest,
}

impl PendingAnalysis {
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

/// Owns one user's input snapshot, result and selection.
pub struct AnnotationSession<M> {
    model: M,
    credential: Option<String>,
    params: GenerationParams,
    state: SessionState,
    selection: Option<Arc<WordOrigin>>,
    run: u64,
}

impl<M: GenerativeModel> AnnotationSession<M> {
    pub fn new(model: M, credential: Option<String>, params: GenerationParams) -> Self {
        Self {
            model,
            credential: credential.filter(|key| !key.trim().is_empty()),
            params,
            state: SessionState::Idle,
            selection: None,
            run: 0,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Analyzing { .. })
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Explicit save action from the settings surface. Blank clears the key.
    pub fn set_credential(&mut self, key: &str) {
        let key = key.trim();
        self.credential = (!key.is_empty()).then(|| key.to_string());
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SessionState::Ready { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        match &self.state {
            SessionState::Ready { segments, .. } => segments,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&Arc<WordOrigin>> {
        self.selection.as_ref()
    }

    /// Selects a record of the current result. Anything else is ignored.
    pub fn select(&mut self, origin: &Arc<WordOrigin>) -> bool {
        let belongs = self.result().is_some_and(|result| result.contains(origin));
        if belongs {
            self.selection = Some(Arc::clone(origin));
        }
        belongs
    }

    /// Back to idle, e.g. when the input box is cleared. A reply still in
    /// flight is discarded when it arrives.
    pub fn clear(&mut self) {
        self.run += 1;
        self.selection = None;
        self.state = SessionState::Idle;
    }

    pub fn begin(&mut self, text: &str) -> Result<PendingAnalysis, SessionError> {
        self.begin_with(text, None)
    }

    pub fn begin_route(&mut self, text: &str, route: &str) -> Result<PendingAnalysis, SessionError> {
        self.begin_with(text, Some(route.trim().to_string()))
    }

    fn begin_with(&mut self, text: &str, route: Option<String>) -> Result<PendingAnalysis, SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        if text.trim().is_empty() || route.as_deref().is_some_and(str::is_empty) {
            return Err(SessionError::EmptyInput);
        }
        let credential = self.credential.clone().ok_or(SessionError::MissingCredential)?;

        let prompt = match route.as_deref() {
            Some(route) => build_route_prompt(text, route),
            None => build_prompt(text),
        };

        self.run += 1;
        self.selection = None;
        self.state = SessionState::Analyzing { text: text.to_string() };
        info!(run = self.run, chars = text.chars().count(), route = route.as_deref(), "analysis started");

        Ok(PendingAnalysis {
            run: self.run,
            text: text.to_string(),
            request: GenerationRequest { prompt, credential, params: self.params.clone() },
        })
    }

    /// Applies the model outcome for `pending` and moves to Ready or Failed.
    pub fn finish(
        &mut self,
        pending: PendingAnalysis,
        outcome: Result<String, ModelError>,
    ) -> Result<AnalysisResult, SessionError> {
        if pending.run != self.run || !self.is_busy() {
            info!(run = pending.run, "discarding reply for superseded analysis");
            return Err(SessionError::Superseded);
        }

        let parsed = outcome
            .map_err(SessionError::from)
            .and_then(|raw| parse_response(&raw).map_err(SessionError::from));
        match parsed {
            Ok(result) => {
                let segments = segment(&pending.text, result.found());
                info!(
                    run = pending.run,
                    words = result.words.len(),
                    highlights = segments.iter().filter(|s| s.is_highlight()).count(),
                    "analysis ready"
                );
                self.state = SessionState::Ready { text: pending.text, result: result.clone(), segments };
                Ok(result)
            }
            Err(e) => {
                warn!(run = pending.run, error = %e, "analysis failed");
                self.state = SessionState::Failed { text: pending.text, message: e.to_string() };
                Err(e)
            }
        }
    }

    pub async fn run_analysis(&mut self, text: &str) -> Result<AnalysisResult, SessionError> {
        let pending = self.begin(text)?;
        let outcome = self.model.generate(pending.request()).await;
        self.finish(pending, outcome)
    }

    /// Like [`Self::run_analysis`], but the model is asked only for words
    /// borrowed through `route`. Its answer is taken as given.
    pub async fn run_route_analysis(&mut self, text: &str, route: &str) -> Result<AnalysisResult, SessionError> {
        let pending = self.begin_route(text, route)?;
        let outcome = self.model.generate(pending.request()).await;
        self.finish(pending, outcome)
    }

    /// Analyses each text in turn. A failure is recorded in that text's
    /// result instead of stopping the batch.
    pub async fn run_batch(&mut self, texts: &[String]) -> Vec<AnalysisResult> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            let result = self
                .run_analysis(text)
                .await
                .unwrap_or_else(|e| AnalysisResult::failed(e.to_string()));
            results.push(result);
        }
        results
    }

    /// Deep lookup of a single word. Leaves the session state alone.
    pub async fn lookup(&self, word: &str) -> Result<WordLookup, SessionError> {
        if word.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }
        let credential = self.credential.clone().ok_or(SessionError::MissingCredential)?;
        let request = GenerationRequest {
            prompt: build_lookup_prompt(word.trim()),
            credential,
            params: self.params.clone(),
        };
        let raw = self.model.generate(&request).await?;
        Ok(parse_lookup(&raw, word)?)
    }
}
