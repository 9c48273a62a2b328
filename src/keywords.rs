//! Keyword extractor.
//!
//! Tokenizes text into a deduplicated set of candidate interest keywords.
//! Used only as evidence input to the personality evolution engine.

use std::collections::HashSet;

/// Common words that carry no interest signal. Tokens of length ≤ 3 are
/// dropped before this list is consulted, so short stopwords are omitted.
const STOPWORDS: &[&str] = &[
    "this", "that", "with", "from", "have", "what", "your", "just", "they", "them", "were", "been",
    "their", "there", "then", "than", "when", "will", "would", "could", "should", "about", "which",
    "some", "very", "really", "today", "because", "into", "over", "after", "before", "being",
    "doing", "going", "much", "many", "more", "most", "other", "such", "only", "also", "here",
    "where", "while", "these", "those", "every", "again", "always", "never", "little",
];

/// Extract candidate interest keywords from `text`.
///
/// Lowercases the text, strips all non-alphanumeric/non-space characters,
/// splits on whitespace, then drops tokens of length ≤ 3, stopwords, and
/// tokens that are entirely numeric. The result is a set; order carries no
/// meaning.
#[must_use]
pub fn extract(text: &str) -> HashSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() > 3)
        .filter(|t| !STOPWORDS.contains(t))
        .filter(|t| !t.chars().all(char::is_numeric))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_empty_set() {
        assert!(extract("").is_empty());
        assert!(extract("   ").is_empty());
    }

    #[test]
    fn short_tokens_are_dropped() {
        let set = extract("the dog ran far uphill");
        assert!(!set.contains("dog"));
        assert!(!set.contains("ran"));
        assert!(set.contains("uphill"));
    }

    #[test]
    fn stopwords_are_dropped() {
        let set = extract("today they went hiking because it was sunny");
        assert!(!set.contains("today"));
        assert!(!set.contains("because"));
        assert!(set.contains("hiking"));
        assert!(set.contains("sunny"));
    }

    #[test]
    fn numbers_are_dropped() {
        let set = extract("counted 12345 squirrels at 0900");
        assert!(!set.contains("12345"));
        assert!(!set.contains("0900"));
        assert!(set.contains("counted"));
        assert!(set.contains("squirrels"));
    }

    #[test]
    fn punctuation_is_stripped_not_split() {
        // "fetch!" → "fetch"; "don't" → "dont" (strip, not replace).
        let set = extract("fetch! don't stop");
        assert!(set.contains("fetch"));
        assert!(set.contains("dont"));
    }

    #[test]
    fn output_is_deduplicated_and_lowercased() {
        let set = extract("Hiking HIKING hiking");
        assert_eq!(set.len(), 1);
        assert!(set.contains("hiking"));
    }
}
