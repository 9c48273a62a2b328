//! Importance estimator.
//!
//! Maps a memory's text, sentiment, and linkage to a 1–10 salience score.
//! Pure and deterministic; the result is always clamped to [1, 10].

/// Baseline importance before any bonuses.
const BASE: i32 = 5;

/// Phrases that mark an experience as notable regardless of sentiment.
/// Matched as case-sensitive substrings.
const SALIENCE_MARKERS: &[&str] = &[
    "first time",
    "never before",
    "memorable",
    "once in a lifetime",
    "unforgettable",
];

/// Estimate the importance of an experience.
///
/// Starts at 5 and adds:
/// - +1 if the text exceeds 300 chars, +1 more beyond 500 (length up to +2)
/// - +1 if |sentiment| > 0.5, +1 more beyond 0.8 (intensity up to +2)
/// - +1 if the experience references another agent or artifact
/// - +1 if the text contains a salience marker phrase
#[must_use]
pub fn estimate(text: &str, sentiment: f32, has_relation: bool) -> u8 {
    let mut score = BASE;

    let len = text.chars().count();
    if len > 300 {
        score += 1;
    }
    if len > 500 {
        score += 1;
    }

    let intensity = sentiment.abs();
    if intensity > 0.5 {
        score += 1;
    }
    if intensity > 0.8 {
        score += 1;
    }

    if has_relation {
        score += 1;
    }

    if SALIENCE_MARKERS.iter().any(|m| text.contains(m)) {
        score += 1;
    }

    score.clamp(1, 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_short_text_is_base() {
        assert_eq!(estimate("saw a bird", 0.0, false), 5);
    }

    #[test]
    fn length_bonus_tiers() {
        let medium = "x".repeat(301);
        let long = "x".repeat(501);
        assert_eq!(estimate(&medium, 0.0, false), 6);
        assert_eq!(estimate(&long, 0.0, false), 7);
    }

    #[test]
    fn length_boundaries_are_exclusive() {
        assert_eq!(estimate(&"x".repeat(300), 0.0, false), 5);
        assert_eq!(estimate(&"x".repeat(500), 0.0, false), 6);
    }

    #[test]
    fn intensity_bonus_tiers() {
        assert_eq!(estimate("ok", 0.6, false), 6);
        assert_eq!(estimate("ok", -0.9, false), 7);
        assert_eq!(estimate("ok", 0.5, false), 5);
    }

    #[test]
    fn relation_bonus() {
        assert_eq!(estimate("met someone", 0.0, true), 6);
    }

    #[test]
    fn salience_marker_bonus() {
        assert_eq!(estimate("first time at the beach", 0.0, false), 6);
        // Case-sensitive as authored.
        assert_eq!(estimate("First Time at the beach", 0.0, false), 5);
    }

    #[test]
    fn worked_example_is_nine() {
        // 600 chars + marker + relation, zero sentiment:
        // 5 (base) + 2 (length) + 1 (relation) + 1 (marker) = 9.
        let filler = "z".repeat(600 - "first time at the canyon ".chars().count());
        let text = format!("first time at the canyon {filler}");
        assert_eq!(text.chars().count(), 600);
        assert_eq!(estimate(&text, 0.0, true), 9);
    }

    #[test]
    fn everything_maxed_clamps_to_ten() {
        let text = format!("never before {}", "y".repeat(600));
        assert_eq!(estimate(&text, 1.0, true), 10);
    }
}
