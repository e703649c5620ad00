use crate::types::word_origin::{Segment, WordOrigin};
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::{Arc, LazyLock};

// Alphanumerics plus combining marks, so a Tamil vowel sign never ends a word.
static WORD_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Alphabetic}\p{N}\p{M}]$").unwrap());

fn is_word_char(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_alphanumeric();
    }
    let mut buf = [0u8; 4];
    WORD_CHAR.is_match(c.encode_utf8(&mut buf))
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// A literal, case-insensitive, whole-word matcher for one surface form.
/// The word is compared character by character; it is never turned into
/// pattern syntax.
#[derive(Debug)]
pub struct LiteralPattern<'w> {
    needle: &'w str,
}

impl<'w> LiteralPattern<'w> {
    /// `None` for an empty word, which must never match.
    pub fn new(word: &'w str) -> Option<Self> {
        if word.is_empty() {
            None
        } else {
            Some(Self { needle: word })
        }
    }

    /// Byte length of the match starting at `start`, if the word sits there
    /// as a whole word.
    pub fn match_at(&self, text: &str, start: usize) -> Option<usize> {
        let rest = &text[start..];
        let mut consumed = 0;
        let mut haystack = rest.chars();
        for wanted in self.needle.chars() {
            let found = haystack.next()?;
            if !eq_ignore_case(found, wanted) {
                return None;
            }
            consumed += found.len_utf8();
        }

        let before_ok = text[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = rest[consumed..].chars().next().map_or(true, |c| !is_word_char(c));
        (before_ok && after_ok).then_some(consumed)
    }
}

/// Non-overlapping byte ranges keyed by start.
#[derive(Debug, Default)]
struct Claims {
    by_start: BTreeMap<usize, (usize, usize)>,
}

impl Claims {
    fn intersects(&self, span: &Range<usize>) -> bool {
        self.by_start
            .range(..span.end)
            .next_back()
            .is_some_and(|(_, &(end, _))| end > span.start)
    }

    fn claim(&mut self, span: Range<usize>, owner: usize) {
        self.by_start.insert(span.start, (span.end, owner));
    }
}

/// Splits `original` into literal and highlighted segments.
///
/// `words` is in priority order: when two records would cover overlapping
/// text, the one listed first keeps it. Every occurrence of a word becomes
/// its own highlight, and the segment texts always concatenate back to
/// `original`.
pub fn segment(original: &str, words: &[Arc<WordOrigin>]) -> Vec<Segment> {
    let mut claims = Claims::default();

    for (owner, origin) in words.iter().enumerate() {
        let Some(pattern) = LiteralPattern::new(&origin.word) else {
            continue;
        };

        let mut cursor = 0;
        while cursor < original.len() {
            let matched = pattern
                .match_at(original, cursor)
                .map(|len| cursor..cursor + len)
                .filter(|span| !claims.intersects(span));

            match matched {
                Some(span) => {
                    cursor = span.end;
                    claims.claim(span, owner);
                }
                None => {
                    cursor += original[cursor..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
    }

    let mut segments = Vec::with_capacity(claims.by_start.len() * 2 + 1);
    let mut last = 0;
    for (&start, &(end, owner)) in &claims.by_start {
        if start > last {
            segments.push(Segment::Literal { text: original[last..start].to_string(), span: last..start });
        }
        segments.push(Segment::Highlight {
            text: original[start..end].to_string(),
            span: start..end,
            origin: Arc::clone(&words[owner]),
        });
        last = end;
    }
    if last < original.len() {
        segments.push(Segment::Literal { text: original[last..].to_string(), span: last..original.len() });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn origins(words: &[&str]) -> Vec<Arc<WordOrigin>> {
        words.iter().map(|w| Arc::new(WordOrigin::new(*w))).collect()
    }

    fn rebuilt(segments: &[Segment]) -> String {
        segments.iter().map(Segment::text).collect()
    }

    fn highlights(segments: &[Segment]) -> Vec<(&str, &str)> {
        segments
            .iter()
            .filter_map(|s| s.origin().map(|o| (s.text(), o.word.as_str())))
            .collect()
    }

    #[test]
    fn no_words_is_one_literal() {
        let segments = segment("I ate rice.", &[]);
        assert_eq!(segments, vec![Segment::Literal { text: "I ate rice.".into(), span: 0..11 }]);
    }

    #[test]
    fn no_match_is_one_literal() {
        let segments = segment("plain text", &origins(&["mango"]));
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].is_highlight());
    }

    #[test]
    fn empty_input_has_no_segments() {
        assert!(segment("", &origins(&["mango"])).is_empty());
    }

    #[test]
    fn highlights_keep_original_casing() {
        let words = origins(&["MANGO", "curry"]);
        let segments = segment("Mango Curry with rice", &words);
        assert_eq!(highlights(&segments), vec![("Mango", "MANGO"), ("Curry", "curry")]);
        assert_eq!(rebuilt(&segments), "Mango Curry with rice");
    }

    #[test]
    fn substring_inside_word_is_not_matched() {
        let segments = segment("category of boats", &origins(&["cat"]));
        assert!(highlights(&segments).is_empty());
    }

    #[test]
    fn shorter_word_does_not_fragment_longer_one() {
        let segments = segment("my catamaran", &origins(&["cat", "catamaran"]));
        assert_eq!(highlights(&segments), vec![("catamaran", "catamaran")]);
        assert_eq!(segments[0], Segment::Literal { text: "my ".into(), span: 0..3 });
    }

    #[test]
    fn first_listed_wins_overlap() {
        let text = "mango curry tonight";
        let segments = segment(text, &origins(&["curry", "mango curry"]));
        assert_eq!(highlights(&segments), vec![("curry", "curry")]);

        let segments = segment(text, &origins(&["mango curry", "curry"]));
        assert_eq!(highlights(&segments), vec![("mango curry", "mango curry")]);
        assert_eq!(rebuilt(&segments), text);
    }

    #[test]
    fn metacharacters_match_literally() {
        let segments = segment("the a+b test, not aab", &origins(&["a+b"]));
        assert_eq!(highlights(&segments), vec![("a+b", "a+b")]);

        let segments = segment("nothing (here) .* at all", &origins(&[".*", "(here)"]));
        assert_eq!(highlights(&segments), vec![("(here)", "(here)"), (".*", ".*")]);
    }

    #[test]
    fn every_occurrence_is_highlighted_with_the_same_record() {
        let words = origins(&["curry"]);
        let segments = segment("curry, more curry; CURRY", &words);
        let hits: Vec<_> = segments.iter().filter_map(Segment::origin).collect();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|o| Arc::ptr_eq(o, &words[0])));
    }

    #[test]
    fn duplicate_records_do_not_double_highlight() {
        let words = origins(&["rice", "rice"]);
        let segments = segment("rice and rice", &words);
        let hits: Vec<_> = segments.iter().filter_map(Segment::origin).collect();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|o| Arc::ptr_eq(o, &words[0])));
    }

    #[test]
    fn empty_word_is_skipped() {
        let segments = segment("abc", &origins(&["", "abc"]));
        assert_eq!(highlights(&segments), vec![("abc", "abc")]);
    }

    #[test]
    fn tamil_vowel_signs_count_as_word_characters() {
        // "கற" must not match inside "கறி" (the trailing vowel sign is a mark).
        let segments = segment("கறி சாதம்", &origins(&["கற", "கறி"]));
        assert_eq!(highlights(&segments), vec![("கறி", "கறி")]);
    }

    #[test]
    fn punctuation_and_whitespace_survive() {
        let text = "  cash!\n\t(betel)  ";
        let segments = segment(text, &origins(&["cash", "betel"]));
        assert_eq!(rebuilt(&segments), text);
        assert_eq!(highlights(&segments), vec![("cash", "cash"), ("betel", "betel")]);
    }

    #[test]
    fn partition_is_lossless_and_non_overlapping() {
        let texts = [
            "I ate mango curry with rice and went on my catamaran boat",
            "catcat cat-cat ca t CAT.",
            "ÄÖ äö straße STRASSE",
            "a+b+a+b a + b",
            "",
        ];
        let words = origins(&["cat", "curry", "mango curry", "äö", "a+b", "b+a", "straße", " ", "boat"]);
        for text in texts {
            let segments = segment(text, &words);
            assert_eq!(rebuilt(&segments), text);

            let mut last_end = 0;
            for seg in &segments {
                let span = seg.span();
                assert_eq!(span.start, last_end);
                assert!(span.end > span.start);
                assert_eq!(&text[span.clone()], seg.text());
                last_end = span.end;
            }
            assert_eq!(last_end, text.len());
        }
    }
}
