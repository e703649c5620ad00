use aditamil::model::{GenerationParams, GenerationRequest, GenerativeModel, ModelError};
use aditamil::{AnnotationSession, SessionError, SessionState, WordOrigin};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned replies and records every request it receives.
#[derive(Clone, Default)]
struct ScriptedModel {
    replies: Arc<Mutex<VecDeque<Result<String, ModelError>>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl ScriptedModel {
    fn with(replies: Vec<Result<String, ModelError>>) -> Self {
        Self { replies: Arc::new(Mutex::new(replies.into())), ..Default::default() }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> GenerationRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok("[]".to_string()))
    }
}

fn session_with(model: &ScriptedModel) -> AnnotationSession<ScriptedModel> {
    AnnotationSession::new(model.clone(), Some("test-key".to_string()), GenerationParams::default())
}

const MANGO_CURRY: &str = "```json\n{\"words\":[\
{\"word\":\"mango\",\"tamilOrigin\":\"மாங்காய்\",\"route\":\"via Portuguese\"},\
{\"word\":\"curry\",\"tamilOrigin\":\"கறி\",\"route\":\"direct\"}]}\n```";

#[tokio::test]
async fn blank_input_never_calls_the_model() {
    let model = ScriptedModel::default();
    let mut session = session_with(&model);

    assert_eq!(session.run_analysis("   \n\t").await, Err(SessionError::EmptyInput));
    assert_eq!(session.run_analysis("").await, Err(SessionError::EmptyInput));
    assert_eq!(model.calls(), 0);
    assert_eq!(session.state(), &SessionState::Idle);
}

#[tokio::test]
async fn missing_credential_never_calls_the_model() {
    let model = ScriptedModel::default();
    let mut session = AnnotationSession::new(model.clone(), Some("  ".to_string()), GenerationParams::default());

    assert_eq!(session.run_analysis("mango").await, Err(SessionError::MissingCredential));
    assert_eq!(model.calls(), 0);

    session.set_credential("saved-key");
    session.run_analysis("mango").await.unwrap();
    assert_eq!(model.last_request().credential, "saved-key");
}

#[tokio::test]
async fn successful_analysis_segments_the_text() {
    let model = ScriptedModel::with(vec![Ok(MANGO_CURRY.to_string())]);
    let mut session = session_with(&model);
    let text = "I ate Mango curry with rice";

    let result = session.run_analysis(text).await.unwrap();
    assert_eq!(result.words.len(), 2);

    let request = model.last_request();
    assert!(request.prompt.contains(text));
    assert_eq!(request.credential, "test-key");
    assert_eq!(request.params, GenerationParams::default());

    let highlighted: Vec<&str> = session
        .segments()
        .iter()
        .filter(|s| s.is_highlight())
        .map(|s| s.text())
        .collect();
    assert_eq!(highlighted, vec!["Mango", "curry"]);
    let rebuilt: String = session.segments().iter().map(|s| s.text()).collect();
    assert_eq!(rebuilt, text);
    assert!(session.selection().is_none());
}

#[tokio::test]
async fn resubmitting_clears_selection_before_results_arrive() {
    let model = ScriptedModel::with(vec![Ok(MANGO_CURRY.to_string()), Ok(MANGO_CURRY.to_string())]);
    let mut session = session_with(&model);

    session.run_analysis("mango curry").await.unwrap();
    let mango = Arc::clone(&session.result().unwrap().words[0]);
    assert!(session.select(&mango));
    assert_eq!(session.selection().map(|w| w.word.as_str()), Some("mango"));

    let pending = session.begin("more mango").unwrap();
    assert!(session.selection().is_none());
    assert!(session.segments().is_empty());
    assert!(session.result().is_none());
    assert!(matches!(session.state(), SessionState::Analyzing { .. }));

    let outcome = model.generate(pending.request()).await;
    session.finish(pending, outcome).unwrap();
    assert!(session.selection().is_none());
    assert!(!session.select(&mango), "records from an earlier run are not selectable");
}

#[tokio::test]
async fn submit_while_busy_is_rejected() {
    let model = ScriptedModel::default();
    let mut session = session_with(&model);

    let pending = session.begin("curry").unwrap();
    assert_eq!(session.begin("rice").unwrap_err(), SessionError::Busy);
    assert_eq!(session.run_analysis("rice").await, Err(SessionError::Busy));
    assert_eq!(model.calls(), 0);

    session.finish(pending, Ok("[]".to_string())).unwrap();
    assert!(!session.is_busy());
    assert!(session.begin("rice").is_ok());
}

#[tokio::test]
async fn transport_failure_becomes_analysis_failed() {
    let model = ScriptedModel::with(vec![Err(ModelError::Http { status: 500, message: "boom".into() })]);
    let mut session = session_with(&model);

    let err = session.run_analysis("curry").await.unwrap_err();
    match &err {
        SessionError::AnalysisFailed(reason) => assert!(reason.contains("500") && reason.contains("boom")),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(session.error_message(), Some(err.to_string().as_str()));
    assert!(session.segments().is_empty());
    assert!(session.selection().is_none());
}

#[tokio::test]
async fn empty_candidates_and_empty_text_fail_uniformly() {
    let model = ScriptedModel::with(vec![Err(ModelError::EmptyCandidates), Ok("  ```json\n```  ".to_string())]);
    let mut session = session_with(&model);

    assert!(matches!(session.run_analysis("a").await, Err(SessionError::AnalysisFailed(_))));
    assert_eq!(
        session.run_analysis("b").await,
        Err(SessionError::AnalysisFailed("API returned empty text content.".to_string()))
    );
    assert!(matches!(session.state(), SessionState::Failed { .. }));
}

#[tokio::test]
async fn malformed_reply_is_no_words_found() {
    let model = ScriptedModel::with(vec![Ok("I cannot help with that.".to_string())]);
    let mut session = session_with(&model);

    let result = session.run_analysis("plain bread").await.unwrap();
    assert!(result.words.is_empty());
    assert_eq!(session.segments().len(), 1);
    assert_eq!(session.segments()[0].text(), "plain bread");
    assert!(matches!(session.state(), SessionState::Ready { .. }));
}

#[tokio::test]
async fn clearing_discards_a_reply_in_flight() {
    let model = ScriptedModel::default();
    let mut session = session_with(&model);

    let pending = session.begin("mango").unwrap();
    session.clear();
    assert_eq!(session.state(), &SessionState::Idle);

    let late = session.finish(pending, Ok(MANGO_CURRY.to_string()));
    assert_eq!(late, Err(SessionError::Superseded));
    assert_eq!(session.state(), &SessionState::Idle);
}

#[tokio::test]
async fn foreign_records_cannot_be_selected() {
    let model = ScriptedModel::with(vec![Ok(MANGO_CURRY.to_string())]);
    let mut session = session_with(&model);

    let stranger = Arc::new(WordOrigin::new("mango"));
    assert!(!session.select(&stranger));

    session.run_analysis("mango").await.unwrap();
    assert!(!session.select(&stranger));
    assert!(session.selection().is_none());
}

#[tokio::test]
async fn route_analysis_trusts_the_model_answer() {
    let reply = r#"{"words_found":[{"word":"mango"},{"word":"cash","route":"Portugal"}],"summary":"Both via Portuguese."}"#;
    let model = ScriptedModel::with(vec![Ok(reply.to_string())]);
    let mut session = session_with(&model);

    let result = session.run_route_analysis("mango and cash", "Portuguese").await.unwrap();
    let kept: Vec<&str> = result.words.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(kept, vec!["mango", "cash"]);
    assert_eq!(result.summary, "Both via Portuguese.");
    assert!(model.last_request().prompt.contains("came through \"Portuguese\""));

    let highlighted: Vec<&str> = session.segments().iter().filter(|s| s.is_highlight()).map(|s| s.text()).collect();
    assert_eq!(highlighted, vec!["mango", "cash"]);
}

#[tokio::test]
async fn route_analysis_rejects_blank_route() {
    let model = ScriptedModel::default();
    let mut session = session_with(&model);

    assert_eq!(session.run_route_analysis("mango", "  ").await, Err(SessionError::EmptyInput));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn batch_records_failures_per_text() {
    let model = ScriptedModel::with(vec![
        Ok(MANGO_CURRY.to_string()),
        Err(ModelError::Api("quota exceeded".into())),
    ]);
    let mut session = session_with(&model);
    let texts = vec!["mango curry".to_string(), "rice".to_string(), "   ".to_string()];

    let results = session.run_batch(&texts).await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].words.len(), 2);
    assert!(results[1].error.as_deref().is_some_and(|e| e.contains("quota exceeded")));
    assert_eq!(results[2].error.as_deref(), Some("Please enter some text to analyze."));
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn lookup_leaves_session_state_alone() {
    let reply = r#"{"word":"catamaran","hasTamilOrigin":true,"tamilOrigin":"கட்டுமரம்","relatedWords":["kattumaram"]}"#;
    let model = ScriptedModel::with(vec![Ok(reply.to_string())]);
    let session = session_with(&model);

    let lookup = session.lookup("catamaran").await.unwrap();
    assert!(lookup.has_tamil_origin);
    assert_eq!(lookup.related_words, vec!["kattumaram".to_string()]);
    assert!(model.last_request().prompt.contains("\"catamaran\""));
    assert_eq!(session.state(), &SessionState::Idle);
}
