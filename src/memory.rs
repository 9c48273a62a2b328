//! The memory record — one recorded experience of an agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AgentId, ArtifactId, Embedding, MemoryId, MemoryKind};

/// One recorded experience of an agent.
///
/// Created by `record_experience`; mutated only by the recall reinforcer
/// (importance, access metadata). The engine never deletes memories —
/// retention is an external policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Unique identifier for this memory.
    pub id: MemoryId,
    /// The agent this memory belongs to.
    pub agent_id: AgentId,
    /// Natural-language description of the experience.
    pub content: String,
    /// Vector embedding of the content, for similarity retrieval.
    pub embedding: Embedding,
    /// What kind of experience this was.
    pub kind: MemoryKind,
    /// Sentiment of the experience, clamped to [-1, 1].
    pub sentiment: f32,
    /// Salience score, clamped to [1, 10].
    pub importance: u8,
    /// When the experience was recorded.
    pub created_at: DateTime<Utc>,
    /// When the memory was last recalled, if ever.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// How many times the memory has been recalled.
    pub access_count: u32,
    /// The other agent this experience involved, if any.
    pub related_agent_id: Option<AgentId>,
    /// The artifact this experience involved, if any.
    pub related_artifact_id: Option<ArtifactId>,
}

impl Memory {
    /// Create a new memory, clamping `sentiment` and `importance` to their
    /// valid ranges. At most one of `related_agent_id`/`related_artifact_id`
    /// may be set; callers enforce that before construction.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        agent_id: AgentId,
        content: impl Into<String>,
        embedding: Embedding,
        kind: MemoryKind,
        sentiment: f32,
        importance: u8,
        created_at: DateTime<Utc>,
        related_agent_id: Option<AgentId>,
        related_artifact_id: Option<ArtifactId>,
    ) -> Self {
        Self {
            id: MemoryId::new(),
            agent_id,
            content: content.into(),
            embedding,
            kind,
            sentiment: sentiment.clamp(-1.0, 1.0),
            importance: importance.clamp(1, 10),
            created_at,
            last_accessed_at: None,
            access_count: 0,
            related_agent_id,
            related_artifact_id,
        }
    }

    /// Whether this experience references another agent or an artifact.
    #[must_use]
    pub fn has_relation(&self) -> bool {
        self.related_agent_id.is_some() || self.related_artifact_id.is_some()
    }
}

/// A partial update to a memory, applied by the recall reinforcer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryPatch {
    /// New importance, if changed.
    pub importance: Option<u8>,
    /// New access count, if changed.
    pub access_count: Option<u32>,
    /// New last-accessed timestamp, if changed.
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl MemoryPatch {
    /// Apply this patch to a memory in place.
    pub fn apply(&self, memory: &mut Memory) {
        if let Some(importance) = self.importance {
            memory.importance = importance.clamp(1, 10);
        }
        if let Some(count) = self.access_count {
            memory.access_count = count;
        }
        if let Some(at) = self.last_accessed_at {
            memory.last_accessed_at = Some(at);
        }
    }
}
