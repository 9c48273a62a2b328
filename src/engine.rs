//! The public engine facade.
//!
//! [`PersonaEngine`] is the narrow request/response surface the surrounding
//! application calls into. Each operation is handled as an independent,
//! stateless request; there is no background loop. Concurrent writers for
//! the same agent race on read-modify-write of relationship and personality
//! rows — acknowledged and tolerated, per the product's resilience posture.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{PawmindError, Result};
use crate::evolution;
use crate::memory::Memory;
use crate::personality::{AgentProfile, PersonalityState};
use crate::relationship::Relationship;
use crate::reinforce;
use crate::store::MemoryStore;
use crate::types::{AgentId, ArtifactId, MemoryKind};
use crate::{importance, sentiment};

/// The memory, relationship, and personality-evolution engine for one
/// deployment of pet personas.
pub struct PersonaEngine {
    store: MemoryStore,
    embedder: Box<dyn EmbeddingProvider>,
    config: EngineConfig,
}

impl std::fmt::Debug for PersonaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaEngine")
            .field("store", &self.store)
            .field("model", &self.embedder.model_name())
            .finish_non_exhaustive()
    }
}

impl PersonaEngine {
    /// Create an engine over an open store and an embedding collaborator.
    #[must_use]
    pub fn new(
        store: MemoryStore,
        embedder: Box<dyn EmbeddingProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Register an agent, creating its personality state.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Validation`] if the agent is already
    /// registered, or [`PawmindError::Storage`] on persistence failure.
    pub fn register_agent(
        &self,
        agent_id: AgentId,
        profile: AgentProfile,
    ) -> Result<PersonalityState> {
        if self.store.personality(agent_id)?.is_some() {
            return Err(PawmindError::Validation(format!(
                "agent {agent_id} is already registered"
            )));
        }

        let state = PersonalityState::new(agent_id, profile);
        self.store.save_personality(&state)?;
        info!(agent = %agent_id, tone = %state.tone, "agent registered");
        Ok(state)
    }

    /// Record an experience for an agent.
    ///
    /// Annotates the content with sentiment and importance, persists the
    /// memory, updates the pairwise relationship when another agent is
    /// referenced, and always runs the personality evolution engine.
    /// Returns the persisted memory.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Validation`] on malformed input (empty
    /// content, or both a related agent and a related artifact),
    /// [`PawmindError::AgentNotFound`] for an unregistered agent, and
    /// [`PawmindError::Storage`] if the memory or relationship write fails.
    /// Evolution failures are logged, never surfaced: the experience is
    /// already durable by then.
    pub fn record_experience(
        &self,
        agent_id: AgentId,
        content: &str,
        kind: MemoryKind,
        related_agent_id: Option<AgentId>,
        related_artifact_id: Option<ArtifactId>,
    ) -> Result<Memory> {
        if content.trim().is_empty() {
            return Err(PawmindError::Validation("content must not be empty".into()));
        }
        if related_agent_id.is_some() && related_artifact_id.is_some() {
            return Err(PawmindError::Validation(
                "an experience may reference an agent or an artifact, not both".into(),
            ));
        }
        if self.store.personality(agent_id)?.is_none() {
            return Err(PawmindError::AgentNotFound(agent_id));
        }

        let now = Utc::now();
        let sentiment = sentiment::score(content);
        let has_relation = related_agent_id.is_some() || related_artifact_id.is_some();
        let importance = importance::estimate(content, sentiment, has_relation);
        let embedding = self.embedder.embed(content)?;

        let memory = Memory::new(
            agent_id,
            content,
            embedding,
            kind,
            sentiment,
            importance,
            now,
            related_agent_id,
            related_artifact_id,
        );
        self.store.append(&memory)?;
        debug!(
            agent = %agent_id,
            memory = %memory.id,
            sentiment,
            importance,
            "experience recorded"
        );

        if let Some(other) = related_agent_id {
            self.record_interaction(agent_id, other, content, sentiment)?;
        }

        evolution::evolve(&self.store, &self.config.evolution, agent_id, content, now);

        Ok(memory)
    }

    /// Recall the memories most relevant to `query`.
    ///
    /// Embeds the query, fetches the nearest memories above the similarity
    /// floor, and reinforces each returned memory's importance and access
    /// metadata. The returned list reflects the state *before*
    /// reinforcement; a lost reinforcement write never fails the recall.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Validation`] for an empty query, and
    /// [`PawmindError::Storage`] if the retrieval itself fails.
    pub fn recall(&self, agent_id: AgentId, query: &str, k: Option<usize>) -> Result<Vec<Memory>> {
        if query.trim().is_empty() {
            return Err(PawmindError::Validation("query must not be empty".into()));
        }

        let k = k.unwrap_or(self.config.retrieval.top_k);
        let embedding = self.embedder.embed(query)?;
        let memories =
            self.store
                .nearest(agent_id, &embedding, k, self.config.retrieval.min_similarity)?;

        let now = Utc::now();
        for memory in &memories {
            let patch = reinforce::reinforce(memory, now, &self.config.reinforcement);
            if let Err(e) = self.store.update(memory.id, &patch) {
                warn!(memory = %memory.id, error = %e, "reinforcement write failed");
            }
        }

        debug!(agent = %agent_id, hits = memories.len(), "recall");
        Ok(memories)
    }

    /// All relationships held by an agent, most familiar first.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn get_relationships(&self, agent_id: AgentId) -> Result<Vec<Relationship>> {
        self.store.relationships(agent_id)
    }

    /// An agent's current personality state.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::AgentNotFound`] for an unregistered agent.
    pub fn get_personality_state(&self, agent_id: AgentId) -> Result<PersonalityState> {
        self.store
            .personality(agent_id)?
            .ok_or(PawmindError::AgentNotFound(agent_id))
    }

    /// All memories of an agent, most important first. Inspection surface
    /// for profile/debug UIs.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn memories(&self, agent_id: AgentId) -> Result<Vec<Memory>> {
        self.store.all(agent_id)
    }

    /// Direct access to the underlying store, for application shells that
    /// need their own inspection queries.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    fn record_interaction(
        &self,
        agent_id: AgentId,
        other: AgentId,
        text: &str,
        sentiment: f32,
    ) -> Result<()> {
        let now = Utc::now();
        let config = &self.config.relationship;

        let relationship = match self.store.relationship(agent_id, other)? {
            Some(mut existing) => {
                existing.record_interaction(text, sentiment, now, config);
                existing
            }
            None => Relationship::first_interaction(agent_id, other, text, sentiment, now, config),
        };

        self.store.upsert_relationship(&relationship)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashedEmbeddingProvider;

    fn engine() -> PersonaEngine {
        PersonaEngine::new(
            MemoryStore::open_in_memory().expect("open"),
            Box::new(HashedEmbeddingProvider::new(64)),
            EngineConfig::default(),
        )
    }

    fn registered(engine: &PersonaEngine) -> AgentId {
        let agent = AgentId::new();
        engine
            .register_agent(agent, AgentProfile::default())
            .expect("register");
        agent
    }

    #[test]
    fn empty_content_is_rejected_before_persistence() {
        let engine = engine();
        let agent = registered(&engine);
        let err = engine
            .record_experience(agent, "   ", MemoryKind::Post, None, None)
            .expect_err("should fail");
        assert!(matches!(err, PawmindError::Validation(_)));
        assert!(engine.memories(agent).expect("all").is_empty());
    }

    #[test]
    fn both_relations_rejected() {
        let engine = engine();
        let agent = registered(&engine);
        let err = engine
            .record_experience(
                agent,
                "tagged a friend on a photo",
                MemoryKind::Comment,
                Some(AgentId::new()),
                Some(ArtifactId::new()),
            )
            .expect_err("should fail");
        assert!(matches!(err, PawmindError::Validation(_)));
    }

    #[test]
    fn unregistered_agent_is_not_found() {
        let engine = engine();
        let err = engine
            .record_experience(AgentId::new(), "hello", MemoryKind::Post, None, None)
            .expect_err("should fail");
        assert!(matches!(err, PawmindError::AgentNotFound(_)));

        let err = engine
            .get_personality_state(AgentId::new())
            .expect_err("should fail");
        assert!(matches!(err, PawmindError::AgentNotFound(_)));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let engine = engine();
        let agent = registered(&engine);
        let err = engine
            .register_agent(agent, AgentProfile::default())
            .expect_err("should fail");
        assert!(matches!(err, PawmindError::Validation(_)));
    }

    #[test]
    fn empty_query_is_rejected() {
        let engine = engine();
        let agent = registered(&engine);
        let err = engine.recall(agent, "", None).expect_err("should fail");
        assert!(matches!(err, PawmindError::Validation(_)));
    }

    #[test]
    fn recorded_memory_is_annotated() {
        let engine = engine();
        let agent = registered(&engine);
        let memory = engine
            .record_experience(
                agent,
                "happy happy happy happy zoomies",
                MemoryKind::Post,
                None,
                None,
            )
            .expect("record");

        assert!((memory.sentiment - 0.8).abs() < 1e-6);
        assert_eq!(memory.importance, 6, "base 5 + intensity > 0.5");
        assert_eq!(memory.access_count, 0);
    }
}
