//! Lexicon sentiment scorer.
//!
//! Maps free text to a scalar sentiment in [-1, 1] by counting whole-word,
//! case-insensitive hits against two fixed word lists. Deterministic, no
//! side effects, total: any input yields a number.

/// Words that pull the score toward +1.
const POSITIVE_WORDS: &[&str] = &[
    "love",
    "loved",
    "happy",
    "joy",
    "great",
    "good",
    "awesome",
    "amazing",
    "wonderful",
    "best",
    "play",
    "excited",
    "treat",
    "cuddle",
    "friend",
    "delicious",
    "beautiful",
    "sweet",
    "cozy",
    "adorable",
];

/// Words that pull the score toward -1.
const NEGATIVE_WORDS: &[&str] = &[
    "sad",
    "angry",
    "hate",
    "terrible",
    "awful",
    "scared",
    "scary",
    "worst",
    "hurt",
    "lonely",
    "sick",
    "annoyed",
    "grumpy",
    "cry",
    "afraid",
    "mean",
    "upset",
    "pain",
    "growl",
    "hiss",
];

/// Raw score divisor: five net lexicon hits saturate the scale.
const SATURATION: f32 = 5.0;

/// Score `text` into [-1, 1].
///
/// Each whole-word occurrence of a positive-list word adds 1 to the raw
/// score, each negative-list word subtracts 1. A raw score of 0 maps to
/// exactly 0.0; otherwise the score is `raw / 5` clamped to [-1, 1].
#[must_use]
pub fn score(text: &str) -> f32 {
    let mut raw = 0_i32;
    for word in words_of(text) {
        if POSITIVE_WORDS.contains(&word.as_str()) {
            raw += 1;
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            raw -= 1;
        }
    }

    if raw == 0 {
        return 0.0;
    }
    (raw as f32 / SATURATION).clamp(-1.0, 1.0)
}

/// Lowercased whole words of `text`. Splitting on every non-alphanumeric
/// character is what makes lexicon matching whole-word: "playground" yields
/// the single word "playground", never a hit for "play".
fn words_of(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}
