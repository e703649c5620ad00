//! Prompt rendering. The wording can change freely; the field names in
//! `RECORD_SCHEMA` cannot, since the response parser reads exactly those keys.

const RECORD_SCHEMA: &str = r#"{
  "words": [
    {
      "word": "the word exactly as it appears in the text",
      "tamilOrigin": "original Tamil word in Tamil script",
      "tamilRomanized": "romanized Tamil word (e.g., kaṭṭumaram)",
      "meaning": "meaning in Tamil/English",
      "etymology": "brief explanation of how it entered the language",
      "route": "direct/via Portuguese/via Dutch/via Arabic/etc",
      "confidence": "Low/Medium/High"
    }
  ],
  "summary": "one sentence overview of the Tamil influence in this text"
}"#;

const EXAMPLES: &str = "Include common words like: catamaran (கட்டுமரம்), curry (கறி), mango (மாங்காய்), \
rice (அரிசி), cash (காசு), cheroot (சுருட்டு), betel (வெற்றிலை), etc.";

const JSON_ONLY: &str = "Return ONLY valid JSON (no markdown, no preamble, no explanation).";

pub fn build_prompt(input_text: &str) -> String {
    format!(
        "Analyze this text and identify ALL words that have Tamil origins, including words that came \
through other languages (like Portuguese, Dutch, Arabic, etc.): \"{input_text}\"

{JSON_ONLY}
If no word qualifies, return {{\"words\": [], \"summary\": \"\"}}.

Strict JSON format:
{RECORD_SCHEMA}

Every \"word\" value must be copied from the text above, not its dictionary form.
{EXAMPLES}"
    )
}

/// Same record shape as [`build_prompt`], restricted to one borrowing route.
pub fn build_route_prompt(input_text: &str, route: &str) -> String {
    format!(
        "Analyze this text and identify ONLY words with Tamil origins that came through \"{route}\": \"{input_text}\"

{JSON_ONLY}
If no word qualifies, return {{\"words\": [], \"summary\": \"\"}}.

Strict JSON format:
{RECORD_SCHEMA}

Every \"word\" value must be copied from the text above, and every \"route\" value must name {route}."
    )
}

pub fn build_lookup_prompt(word: &str) -> String {
    format!(
        r#"Provide detailed Tamil etymology for the word "{word}".

{JSON_ONLY}
{{
  "word": "{word}",
  "hasTamilOrigin": true/false,
  "tamilOrigin": "original Tamil word in Tamil script",
  "tamilRomanized": "romanized Tamil word with diacritics",
  "meaning": "detailed meaning in Tamil and English",
  "etymology": "comprehensive etymology explanation (3-5 sentences)",
  "route": "linguistic route (direct/via Portuguese/Dutch/Arabic/etc)",
  "firstRecordedUse": "time period (e.g., '16th century')",
  "relatedWords": ["list", "of", "related", "words"],
  "examples": ["example usage 1", "example usage 2"],
  "culturalContext": "cultural significance if any"
}}

If the word does not have Tamil origin, set hasTamilOrigin to false and explain its actual origin in etymology."#
    )
}
