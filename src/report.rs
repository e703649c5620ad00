use crate::types::word_origin::{AnalysisResult, Segment, WordLookup};

/// Highlighted words wrapped in `[` `]`, everything else verbatim.
pub fn render_highlighted(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        if seg.is_highlight() {
            out.push('[');
            out.push_str(seg.text());
            out.push(']');
        } else {
            out.push_str(seg.text());
        }
    }
    out
}

pub fn format_analysis(text: &str, result: &AnalysisResult) -> String {
    let mut out = format!("Original text: {text}\n\n");

    if let Some(error) = &result.error {
        out.push_str(&format!("Analysis failed: {error}\n"));
        return out;
    }

    let words = result.found();
    if words.is_empty() {
        out.push_str("No Tamil-origin words found in this text.\n");
    } else {
        let plural = if words.len() == 1 { "" } else { "s" };
        out.push_str(&format!("Found {} word{plural} with Tamil origins:\n\n", words.len()));
        for (i, word) in words.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, word.word));
            out.push_str(&format!("   Tamil Origin: {}{}\n", word.tamil_origin, romanized(&word.tamil_romanized)));
            out.push_str(&format!("   Meaning: {}\n", word.meaning));
            out.push_str(&format!("   Route: {}\n", word.route));
            out.push_str(&format!("   Etymology: {}\n", word.etymology));
            if !word.confidence.is_empty() {
                out.push_str(&format!("   Confidence: {}\n", word.confidence));
            }
            if !word.first_recorded_use.is_empty() {
                out.push_str(&format!("   First recorded: {}\n", word.first_recorded_use));
            }
            out.push('\n');
        }
    }

    if !result.summary.is_empty() {
        out.push_str(&format!("Summary: {}\n", result.summary));
    }
    out
}

pub fn format_route(text: &str, route: &str, result: &AnalysisResult) -> String {
    let mut out = format!("TAMIL WORDS VIA {}\n", route.to_uppercase());
    if result.found().is_empty() && !result.is_failed() {
        out.push_str(&format!("Original text: {text}\n\n"));
        out.push_str(&format!("No Tamil-origin words found via {route} in this text.\n"));
        if !result.summary.is_empty() {
            out.push_str(&format!("Summary: {}\n", result.summary));
        }
        return out;
    }
    out.push_str(&format_analysis(text, result));
    out
}

pub fn format_batch(texts: &[String], results: &[AnalysisResult]) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();
    for (i, (text, result)) in texts.iter().zip(results).enumerate() {
        out.push_str(&format!("{rule}\nTEXT {}/{}\n{rule}\n", i + 1, texts.len()));
        out.push_str(&format_analysis(text, result));
        out.push('\n');
    }
    let failed = results.iter().filter(|r| r.is_failed()).count();
    out.push_str(&format!("{rule}\nBATCH SUMMARY\n{rule}\n"));
    out.push_str(&format!("Analyzed {} text(s) for Tamil-origin words, {failed} failed.\n", texts.len()));
    out
}

pub fn format_lookup(lookup: &WordLookup) -> String {
    let mut out = format!("WORD LOOKUP: {}\n\n", lookup.word);

    if !lookup.has_tamil_origin {
        out.push_str(&format!("'{}' does not appear to have Tamil origin.\n", lookup.word));
        if !lookup.etymology.is_empty() {
            out.push_str(&format!("\n{}\n", lookup.etymology));
        }
        return out;
    }

    out.push_str(&format!("Tamil Word: {}{}\n", lookup.tamil_origin, romanized(&lookup.tamil_romanized)));
    out.push_str(&format!("Meaning: {}\n", lookup.meaning));
    out.push_str(&format!("Route: {}\n", lookup.route));
    out.push_str(&format!("\nEtymology:\n{}\n", lookup.etymology));
    if !lookup.first_recorded_use.is_empty() {
        out.push_str(&format!("\nFirst Recorded: {}\n", lookup.first_recorded_use));
    }
    if !lookup.cultural_context.is_empty() {
        out.push_str(&format!("\nCultural Context:\n{}\n", lookup.cultural_context));
    }
    if !lookup.related_words.is_empty() {
        out.push_str(&format!("\nRelated Words: {}\n", lookup.related_words.join(", ")));
    }
    if !lookup.examples.is_empty() {
        out.push_str("\nExamples:\n");
        for example in &lookup.examples {
            out.push_str(&format!("  - {example}\n"));
        }
    }
    out
}

fn romanized(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!(" ({value})")
    }
}
