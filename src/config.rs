//! Configuration for the pawmind engine.
//!
//! Loadable from TOML. Every tunable carries a default that matches the
//! shipped behavior, so an empty config file yields a working engine.

use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Memory retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Pairwise relationship tracking settings.
    #[serde(default)]
    pub relationship: RelationshipConfig,
    /// Personality evolution thresholds.
    #[serde(default)]
    pub evolution: EvolutionConfig,
    /// Recall reinforcement settings.
    #[serde(default)]
    pub reinforcement: ReinforcementConfig,
    /// Persistence / SQLite settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`crate::PawmindError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::PawmindError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Memory retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of memories returned per recall.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum cosine similarity for a memory to be considered relevant.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
    /// Embedding vector dimensions.
    #[serde(default = "default_dimensions")]
    pub embedding_dimensions: usize,
    /// Embedding model name (informational; the provider is pluggable).
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_similarity: 0.7,
            embedding_dimensions: 384,
            embedding_model: "all-MiniLM-L6-v2".to_string(),
        }
    }
}

/// Pairwise relationship tracking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipConfig {
    /// Maximum interaction history entries kept per relationship.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// Weight given to the accumulated sentiment in exponential smoothing.
    /// The new interaction receives `1 - smoothing`.
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    /// Familiarity ceiling.
    #[serde(default = "default_max_familiarity")]
    pub max_familiarity: f32,
    /// Text length (chars) at which an interaction carries full weight.
    #[serde(default = "default_full_weight_length")]
    pub full_weight_length: usize,
    /// Maximum chars kept in a history entry summary.
    #[serde(default = "default_summary_length")]
    pub summary_length: usize,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            history_cap: 20,
            smoothing: 0.8,
            max_familiarity: 10.0,
            full_weight_length: 500,
            summary_length: 30,
        }
    }
}

/// Personality evolution thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Keyword occurrences required to promote an emerging interest.
    #[serde(default = "default_promotion_threshold")]
    pub interest_promotion_threshold: u32,
    /// Tone-trend counter value that triggers a tone transition lookup.
    #[serde(default = "default_tone_shift_threshold")]
    pub tone_shift_threshold: u32,
    /// How many recent memories feed the tone-drift average.
    #[serde(default = "default_tone_window")]
    pub tone_window: usize,
    /// Absolute average sentiment required to register a drift trend.
    #[serde(default = "default_drift_threshold")]
    pub drift_threshold: f32,
    /// Total-memory thresholds for evolution stages 2..=5.
    #[serde(default = "default_stage_thresholds")]
    pub stage_thresholds: [u64; 4],
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            interest_promotion_threshold: 5,
            tone_shift_threshold: 10,
            tone_window: 20,
            drift_threshold: 0.5,
            stage_thresholds: [100, 250, 500, 1000],
        }
    }
}

/// Recall reinforcement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReinforcementConfig {
    /// Days without access after which a recalled memory decays.
    #[serde(default = "default_stale_days")]
    pub stale_days: i64,
    /// Pre-increment access count above which a recall strengthens a memory.
    #[serde(default = "default_frequent_access_count")]
    pub frequent_access_count: u32,
}

impl Default for ReinforcementConfig {
    fn default() -> Self {
        Self {
            stale_days: 30,
            frequent_access_count: 5,
        }
    }
}

/// Persistence / SQLite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable WAL journal mode for concurrent reads.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u32,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_top_k() -> usize {
    5
}
fn default_min_similarity() -> f32 {
    0.7
}
fn default_dimensions() -> usize {
    384
}
fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}
fn default_history_cap() -> usize {
    20
}
fn default_smoothing() -> f32 {
    0.8
}
fn default_max_familiarity() -> f32 {
    10.0
}
fn default_full_weight_length() -> usize {
    500
}
fn default_summary_length() -> usize {
    30
}
fn default_promotion_threshold() -> u32 {
    5
}
fn default_tone_shift_threshold() -> u32 {
    10
}
fn default_tone_window() -> usize {
    20
}
fn default_drift_threshold() -> f32 {
    0.5
}
fn default_stage_thresholds() -> [u64; 4] {
    [100, 250, 500, 1000]
}
fn default_stale_days() -> i64 {
    30
}
fn default_frequent_access_count() -> u32 {
    5
}
fn default_busy_timeout() -> u32 {
    5000
}
fn default_true() -> bool {
    true
}
