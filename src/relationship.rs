//! Pairwise relationship tracking.
//!
//! A [`Relationship`] is directed state from one agent toward another:
//! rolling familiarity, exponentially-smoothed sentiment, and a bounded FIFO
//! interaction history. The relationship kind is assigned once, from the
//! sign of the first interaction's sentiment, and is never re-evaluated —
//! a deliberate carry-over from the original product behavior.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RelationshipConfig;
use crate::types::{AgentId, RelationshipId};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Overall character of a relationship, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    /// First interaction was positive.
    Friendly,
    /// First interaction was negative.
    Adverse,
    /// First interaction was neither.
    Neutral,
}

impl RelationshipKind {
    /// Classify from the sentiment of the very first interaction.
    #[must_use]
    pub fn from_first_sentiment(sentiment: f32) -> Self {
        if sentiment > 0.0 {
            Self::Friendly
        } else if sentiment < 0.0 {
            Self::Adverse
        } else {
            Self::Neutral
        }
    }

    /// Stable string form used in the storage layer.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Friendly => "friendly",
            Self::Adverse => "adverse",
            Self::Neutral => "neutral",
        }
    }
}

impl std::str::FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "friendly" => Ok(Self::Friendly),
            "adverse" => Ok(Self::Adverse),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!("unknown relationship kind: {other}")),
        }
    }
}

/// Classification of a single interaction. Rules are checked in declaration
/// order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    /// Text mentions play or fun.
    Playful,
    /// Text mentions help or support.
    Helpful,
    /// Strongly positive sentiment.
    Positive,
    /// Strongly negative sentiment.
    Negative,
    /// Everything else.
    Neutral,
}

impl InteractionKind {
    /// Classify an interaction from its text and sentiment.
    #[must_use]
    pub fn classify(text: &str, sentiment: f32) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("play") || lower.contains("fun") {
            Self::Playful
        } else if lower.contains("help") || lower.contains("support") {
            Self::Helpful
        } else if sentiment > 0.5 {
            Self::Positive
        } else if sentiment < -0.5 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction history
// ---------------------------------------------------------------------------

/// One entry in a relationship's bounded interaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// How the interaction was classified.
    pub kind: InteractionKind,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Sentiment of the interaction, clamped to [-1, 1].
    pub sentiment: f32,
    /// Truncated excerpt of the interaction text.
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Relationship
// ---------------------------------------------------------------------------

/// Directed pairwise state from `agent_id` toward `other_agent_id`.
///
/// At most one row exists per ordered pair. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier for this relationship row.
    pub id: RelationshipId,
    /// The agent holding this view of the relationship.
    pub agent_id: AgentId,
    /// The agent the relationship is toward.
    pub other_agent_id: AgentId,
    /// Overall character, fixed at creation.
    pub kind: RelationshipKind,
    /// How well the agent knows the other, in [1, 10]. Non-decreasing.
    pub familiarity: f32,
    /// Exponentially-smoothed sentiment toward the other, in [-1, 1].
    pub sentiment: f32,
    /// When the pair last interacted.
    pub last_interaction_at: DateTime<Utc>,
    /// Bounded FIFO history of recent interactions, oldest first.
    pub history: VecDeque<Interaction>,
}

impl Relationship {
    /// Create a relationship from the pair's first interaction.
    #[must_use]
    pub fn first_interaction(
        agent_id: AgentId,
        other_agent_id: AgentId,
        text: &str,
        sentiment: f32,
        now: DateTime<Utc>,
        config: &RelationshipConfig,
    ) -> Self {
        let sentiment = sentiment.clamp(-1.0, 1.0);
        let mut history = VecDeque::with_capacity(config.history_cap);
        history.push_back(Self::entry(text, sentiment, now, config));

        Self {
            id: RelationshipId::new(),
            agent_id,
            other_agent_id,
            kind: RelationshipKind::from_first_sentiment(sentiment),
            familiarity: 1.0,
            sentiment,
            last_interaction_at: now,
            history,
        }
    }

    /// Fold a subsequent interaction into the relationship.
    ///
    /// Familiarity grows by the interaction weight (longer interactions
    /// count more, capped at 1.0 per interaction) up to the configured
    /// ceiling. Sentiment is exponentially smoothed so that no single
    /// extreme message can flip an established relationship. The history
    /// evicts its oldest entry once the cap is reached.
    pub fn record_interaction(
        &mut self,
        text: &str,
        sentiment: f32,
        now: DateTime<Utc>,
        config: &RelationshipConfig,
    ) {
        let sentiment = sentiment.clamp(-1.0, 1.0);

        let weight = (text.chars().count() as f32 / config.full_weight_length as f32).min(1.0);
        self.familiarity = (self.familiarity + weight).min(config.max_familiarity);

        self.sentiment = config.smoothing * self.sentiment + (1.0 - config.smoothing) * sentiment;

        if self.history.len() >= config.history_cap {
            self.history.pop_front();
        }
        self.history.push_back(Self::entry(text, sentiment, now, config));
        self.last_interaction_at = now;
    }

    fn entry(
        text: &str,
        sentiment: f32,
        now: DateTime<Utc>,
        config: &RelationshipConfig,
    ) -> Interaction {
        Interaction {
            kind: InteractionKind::classify(text, sentiment),
            timestamp: now,
            sentiment,
            summary: text.chars().take(config.summary_length).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RelationshipConfig {
        RelationshipConfig::default()
    }

    fn new_rel(text: &str, sentiment: f32) -> Relationship {
        Relationship::first_interaction(
            AgentId::new(),
            AgentId::new(),
            text,
            sentiment,
            Utc::now(),
            &config(),
        )
    }

    #[test]
    fn classification_precedence() {
        // "play"/"fun" beat everything, even strong negative sentiment.
        assert_eq!(
            InteractionKind::classify("that was not fun at all", -0.9),
            InteractionKind::Playful
        );
        assert_eq!(
            InteractionKind::classify("thanks for the help", -0.9),
            InteractionKind::Helpful
        );
        assert_eq!(InteractionKind::classify("nice day", 0.6), InteractionKind::Positive);
        assert_eq!(InteractionKind::classify("bad day", -0.6), InteractionKind::Negative);
        assert_eq!(InteractionKind::classify("a day", 0.2), InteractionKind::Neutral);
    }

    #[test]
    fn classification_is_case_insensitive_substring() {
        assert_eq!(
            InteractionKind::classify("PLAYTIME in the yard", 0.0),
            InteractionKind::Playful
        );
        // "helpful" contains "help" — substring match is intended here.
        assert_eq!(
            InteractionKind::classify("so helpful", 0.0),
            InteractionKind::Helpful
        );
    }

    #[test]
    fn first_interaction_sets_kind_from_sentiment_sign() {
        assert_eq!(new_rel("hi", 0.3).kind, RelationshipKind::Friendly);
        assert_eq!(new_rel("grr", -0.3).kind, RelationshipKind::Adverse);
        assert_eq!(new_rel("hm", 0.0).kind, RelationshipKind::Neutral);
    }

    #[test]
    fn kind_is_never_reevaluated() {
        let mut rel = new_rel("nice to meet you", 0.8);
        assert_eq!(rel.kind, RelationshipKind::Friendly);
        for _ in 0..50 {
            rel.record_interaction("that was rude", -1.0, Utc::now(), &config());
        }
        assert!(rel.sentiment < 0.0, "sentiment drifts negative");
        assert_eq!(rel.kind, RelationshipKind::Friendly, "kind stays fixed");
    }

    #[test]
    fn sentiment_smoothing_is_eighty_twenty() {
        let mut rel = new_rel("great first chat", 1.0);
        rel.record_interaction("awful second chat", -1.0, Utc::now(), &config());
        // 0.8 * 1.0 + 0.2 * (-1.0) = 0.6
        assert!((rel.sentiment - 0.6).abs() < 1e-6);
    }

    #[test]
    fn familiarity_grows_with_text_length_and_caps() {
        let mut rel = new_rel("hello", 0.0);
        assert!((rel.familiarity - 1.0).abs() < 1e-6);

        // 250 chars → weight 0.5.
        rel.record_interaction(&"a".repeat(250), 0.0, Utc::now(), &config());
        assert!((rel.familiarity - 1.5).abs() < 1e-6);

        // 5000 chars → weight capped at 1.0.
        rel.record_interaction(&"a".repeat(5000), 0.0, Utc::now(), &config());
        assert!((rel.familiarity - 2.5).abs() < 1e-6);

        for _ in 0..20 {
            rel.record_interaction(&"a".repeat(5000), 0.0, Utc::now(), &config());
        }
        assert!((rel.familiarity - 10.0).abs() < 1e-6, "capped at 10");
    }

    #[test]
    fn history_is_bounded_fifo() {
        let mut rel = new_rel("interaction 1", 0.0);
        for i in 2..=21 {
            rel.record_interaction(&format!("interaction {i}"), 0.0, Utc::now(), &config());
        }
        assert_eq!(rel.history.len(), 20);
        // Recording a 21st interaction evicted entry #1.
        assert_eq!(rel.history.front().expect("front").summary, "interaction 2");
        assert_eq!(rel.history.back().expect("back").summary, "interaction 21");
    }

    #[test]
    fn summaries_are_truncated() {
        let rel = new_rel(&"s".repeat(200), 0.0);
        assert_eq!(rel.history[0].summary.chars().count(), 30);
    }
}
