use serde::Serialize;
use std::ops::Range;
use std::sync::Arc;

/// One word the model believes has Tamil roots.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WordOrigin {
    pub word: String,
    pub tamil_origin: String,
    pub tamil_romanized: String,
    pub meaning: String,
    pub etymology: String,
    pub route: String,
    pub confidence: String,
    pub first_recorded_use: String,
}

impl WordOrigin {
    pub fn new(word: impl Into<String>) -> Self {
        Self { word: word.into(), ..Default::default() }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    pub words: Vec<Arc<WordOrigin>>,
    /// The model's one-line overview of the text, when it gave one.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn new(words: Vec<WordOrigin>) -> Self {
        Self { words: words.into_iter().map(Arc::new).collect(), summary: String::new(), error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { words: Vec::new(), summary: String::new(), error: Some(message.into()) }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// The usable records. A failed result never exposes any.
    pub fn found(&self) -> &[Arc<WordOrigin>] {
        if self.is_failed() {
            &[]
        } else {
            &self.words
        }
    }

    pub fn contains(&self, origin: &Arc<WordOrigin>) -> bool {
        self.found().iter().any(|w| Arc::ptr_eq(w, origin))
    }
}

/// Deep single-word lookup.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WordLookup {
    pub word: String,
    pub has_tamil_origin: bool,
    pub tamil_origin: String,
    pub tamil_romanized: String,
    pub meaning: String,
    pub etymology: String,
    pub route: String,
    pub first_recorded_use: String,
    pub related_words: Vec<String>,
    pub examples: Vec<String>,
    pub cultural_context: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Segment {
    Literal {
        text: String,
        span: Range<usize>,
    },
    Highlight {
        text: String,
        span: Range<usize>,
        origin: Arc<WordOrigin>,
    },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Literal { text, .. } | Segment::Highlight { text, .. } => text,
        }
    }

    pub fn span(&self) -> Range<usize> {
        match self {
            Segment::Literal { span, .. } | Segment::Highlight { span, .. } => span.clone(),
        }
    }

    pub fn origin(&self) -> Option<&Arc<WordOrigin>> {
        match self {
            Segment::Highlight { origin, .. } => Some(origin),
            Segment::Literal { .. } => None,
        }
    }

    pub fn is_highlight(&self) -> bool {
        matches!(self, Segment::Highlight { .. })
    }
}
