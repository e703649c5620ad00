use crate::types::word_origin::{AnalysisResult, WordLookup, WordOrigin};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*(\r?\n)?").unwrap());
static CLOSING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\r?\n)?```\s*$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("API returned empty text content.")]
    EmptyResponse,
    #[error("no JSON object found in the model reply")]
    NoPayload,
}

/// Removes a leading and trailing markdown code fence plus surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = match OPENING_FENCE.find(trimmed) {
        Some(m) => &trimmed[m.end()..],
        None => trimmed,
    };
    let without_close = match CLOSING_FENCE.find(without_open) {
        Some(m) => &without_open[..m.start()],
        None => without_open,
    };
    without_close.trim()
}

/// Turns whatever the model replied into validated records.
///
/// Only a reply with no text at all is an error. Anything else that cannot be
/// understood yields an empty word list.
pub fn parse_response(raw: &str) -> Result<AnalysisResult, ParseError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let (elements, summary) = match serde_json::from_str::<Value>(cleaned).ok().and_then(record_list) {
        Some(found) => found,
        None => {
            let elements = salvage_array(cleaned).unwrap_or_else(|| {
                debug!("model reply held no usable word list, treating as no words found");
                Vec::new()
            });
            let summary = salvage_object(cleaned)
                .map(|object| text_field(&object, &["summary"]).trim().to_string())
                .unwrap_or_default();
            (elements, summary)
        }
    };

    let words: Vec<WordOrigin> = elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let origin = coerce_word_origin(element);
            if origin.is_none() {
                debug!(index, "dropping record without a usable `word`");
            }
            origin
        })
        .collect();

    let mut result = AnalysisResult::new(words);
    result.summary = summary;
    Ok(result)
}

/// Parses the reply to a single-word lookup. `asked` fills in the word when
/// the model leaves it out.
pub fn parse_lookup(raw: &str, asked: &str) -> Result<WordLookup, ParseError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let object = match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(object)) => object,
        _ => salvage_object(cleaned).ok_or(ParseError::NoPayload)?,
    };

    let mut lookup = WordLookup {
        word: text_field(&object, &["word"]).trim().to_string(),
        has_tamil_origin: object
            .get("hasTamilOrigin")
            .or_else(|| object.get("has_tamil_origin"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
        tamil_origin: text_field(&object, &["tamilOrigin", "tamil_origin"]),
        tamil_romanized: text_field(&object, &["tamilRomanized", "tamil_romanized"]),
        meaning: text_field(&object, &["meaning"]),
        etymology: text_field(&object, &["etymology"]),
        route: text_field(&object, &["route"]),
        first_recorded_use: text_field(&object, &["firstRecordedUse", "first_recorded_use"]),
        related_words: list_field(&object, &["relatedWords", "related_words"]),
        examples: list_field(&object, &["examples"]),
        cultural_context: text_field(&object, &["culturalContext", "cultural_context"]),
    };
    if lookup.word.is_empty() {
        lookup.word = asked.trim().to_string();
    }
    Ok(lookup)
}

/// Accepts `{"words": [...]}`, `{"words_found": [...]}` or a bare array,
/// along with the object's `summary`. A bare array has none.
fn record_list(value: Value) -> Option<(Vec<Value>, String)> {
    match value {
        Value::Array(items) => Some((items, String::new())),
        Value::Object(mut object) => match object.remove("words").or_else(|| object.remove("words_found")) {
            Some(Value::Array(items)) => Some((items, text_field(&object, &["summary"]).trim().to_string())),
            _ => None,
        },
        _ => None,
    }
}

fn salvage_array(text: &str) -> Option<Vec<Value>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    debug!(start, end, "attempting salvage of bracketed slice");
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn salvage_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// The single gate every model-supplied record passes through.
fn coerce_word_origin(element: &Value) -> Option<WordOrigin> {
    let object = element.as_object()?;
    let word = text_field(object, &["word"]).trim().to_string();
    if word.is_empty() {
        return None;
    }
    Some(WordOrigin {
        word,
        tamil_origin: text_field(object, &["tamilOrigin", "tamil_origin"]),
        tamil_romanized: text_field(object, &["tamilRomanized", "tamil_romanized"]),
        meaning: text_field(object, &["meaning"]),
        etymology: text_field(object, &["etymology"]),
        route: text_field(object, &["route"]),
        confidence: text_field(object, &["confidence"]),
        first_recorded_use: text_field(object, &["firstRecordedUse", "first_recorded_use"]),
    })
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| object.get(*key))
        .map(value_as_text)
        .unwrap_or_default()
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn list_field(object: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match keys.iter().find_map(|key| object.get(*key)) {
        Some(Value::Array(items)) => items
            .iter()
            .map(value_as_text)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}
