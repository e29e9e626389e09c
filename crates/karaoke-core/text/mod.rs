//! Text normalization and sequence comparison
//!
//! Recognized words and user lyrics only become comparable after both pass
//! through [`normalize`]: lowercase, trimmed, punctuation removed. The
//! [`SequenceMatcher`] then compares the normalized forms.

pub mod matcher;

pub use matcher::{similarity, AlignmentOpcode, MatchBlock, SequenceMatcher};

use regex::Regex;
use std::sync::OnceLock;

fn punctuation() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"))
}

/// Canonical comparison form of a word or phrase
///
/// Lowercases, trims surrounding whitespace, then removes every character
/// that is neither a word character nor whitespace. Word characters are
/// Unicode-aware, so accented letters and digits survive.
///
/// ```rust
/// use karaoke_core::text::normalize;
///
/// assert_eq!(normalize("Hello,"), "hello");
/// assert_eq!(normalize("¡Canción!"), "canción");
/// assert_eq!(normalize("..."), "");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    punctuation().replace_all(lowered.trim(), "").into_owned()
}

/// Split lyrics into whitespace-separated tokens
///
/// Tokens keep their original casing and punctuation; they become the
/// displayed text of aligned cues.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Space-joined normalized form of a token sequence
///
/// This is the string the similarity gate scores.
pub fn normalized_phrase<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|token| normalize(token.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("Hello,"), "hello");
        assert_eq!(normalize("  WORLD!  "), "world");
        assert_eq!(normalize("don't"), "dont");
        assert_eq!(normalize("snake_case"), "snake_case");
    }

    #[test]
    fn normalize_keeps_unicode_letters() {
        assert_eq!(normalize("Corazón"), "corazón");
        assert_eq!(normalize("¿Qué?"), "qué");
    }

    #[test]
    fn normalize_can_produce_empty() {
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["Hola, Mundo!", " ¡¿x?! ", "a-b c_d", "ÅNGSTRÖM."] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn tokenize_splits_on_any_whitespace() {
        assert_eq!(tokenize("  one\ttwo\nthree  "), vec!["one", "two", "three"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn normalized_phrase_joins_with_spaces() {
        assert_eq!(normalized_phrase(["Hello,", "World!"]), "hello world");
        assert_eq!(normalized_phrase(Vec::<&str>::new()), "");
    }
}
