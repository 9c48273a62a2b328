//! Personality state and the fixed tone transition table.
//!
//! One [`PersonalityState`] exists per agent, created at registration and
//! mutated exclusively by the evolution engine (`crate::evolution`).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AgentId;

// ---------------------------------------------------------------------------
// Tone drift
// ---------------------------------------------------------------------------

/// Direction of a sustained sentiment trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneTrend {
    /// Recent memories average strongly positive.
    Positive,
    /// Recent memories average strongly negative.
    Negative,
}

/// Accumulated tone-drift evidence, one counter per trend direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneShiftCounters {
    /// Consecutive-evidence count for a positive trend.
    pub positive: u32,
    /// Consecutive-evidence count for a negative trend.
    pub negative: u32,
}

impl ToneShiftCounters {
    /// Increment the counter for `trend` and return its new value.
    pub fn increment(&mut self, trend: ToneTrend) -> u32 {
        let counter = match trend {
            ToneTrend::Positive => &mut self.positive,
            ToneTrend::Negative => &mut self.negative,
        };
        *counter += 1;
        *counter
    }

    /// Clear both counters. A tone change discards accumulated drift in
    /// both directions, not just the triggering one.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Fixed tone transition table: (current tone, trend) → new tone.
///
/// Tones without a mapping for the observed trend are sticky — the counter
/// keeps accumulating but the tone never changes.
const TONE_TRANSITIONS: &[(&str, ToneTrend, &str)] = &[
    ("cheerful", ToneTrend::Negative, "reserved"),
    ("sarcastic", ToneTrend::Positive, "witty"),
    ("grumpy", ToneTrend::Positive, "lovably gruff"),
    ("shy", ToneTrend::Positive, "friendly"),
    ("serious", ToneTrend::Positive, "thoughtful"),
    ("excited", ToneTrend::Negative, "cautious"),
];

/// Look up the tone a `(current, trend)` pair transitions to, if any.
#[must_use]
pub fn tone_transition(current: &str, trend: ToneTrend) -> Option<&'static str> {
    TONE_TRANSITIONS
        .iter()
        .find(|(tone, t, _)| *tone == current && *t == trend)
        .map(|(_, _, next)| *next)
}

// ---------------------------------------------------------------------------
// PersonalityState
// ---------------------------------------------------------------------------

/// The evolving trait profile of one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityState {
    /// The agent this profile belongs to.
    pub agent_id: AgentId,
    /// Current tone label (e.g. "cheerful", "grumpy").
    pub tone: String,
    /// Established interests. Disjoint from `emerging_interests`.
    pub interests: HashSet<String>,
    /// Things the agent dislikes.
    pub dislikes: HashSet<String>,
    /// Behavioral quirks, authored at creation.
    pub quirks: Vec<String>,
    /// Signature phrases, authored at creation.
    pub catchphrases: Vec<String>,
    /// Free-form writing style description.
    pub writing_style: String,
    /// Keyword → occurrence count for interests not yet established.
    pub emerging_interests: HashMap<String, u32>,
    /// Accumulated tone-drift evidence.
    pub tone_shift_counters: ToneShiftCounters,
    /// Evolution stage, 1–5, monotonically non-decreasing.
    pub evolution_stage: u8,
    /// When the stage last advanced, if ever.
    pub last_evolution_at: Option<DateTime<Utc>>,
}

/// The authored portion of a personality, supplied at agent registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Initial tone label.
    pub tone: String,
    /// Initial interests.
    pub interests: HashSet<String>,
    /// Initial dislikes.
    pub dislikes: HashSet<String>,
    /// Behavioral quirks.
    pub quirks: Vec<String>,
    /// Signature phrases.
    pub catchphrases: Vec<String>,
    /// Free-form writing style description.
    pub writing_style: String,
}

impl PersonalityState {
    /// Create the personality for a freshly registered agent.
    #[must_use]
    pub fn new(agent_id: AgentId, profile: AgentProfile) -> Self {
        Self {
            agent_id,
            tone: profile.tone,
            interests: profile.interests,
            dislikes: profile.dislikes,
            quirks: profile.quirks,
            catchphrases: profile.catchphrases,
            writing_style: profile.writing_style,
            emerging_interests: HashMap::new(),
            tone_shift_counters: ToneShiftCounters::default(),
            evolution_stage: 1,
            last_evolution_at: None,
        }
    }
}
