//! SQLite-backed store for memories, relationships, and personality state.
//!
//! Schema:
//!
//! ```sql
//! CREATE TABLE memories (
//!     id                  TEXT PRIMARY KEY,
//!     agent_id            TEXT NOT NULL,
//!     content             TEXT NOT NULL,
//!     embedding           TEXT NOT NULL,   -- JSON float array
//!     kind                TEXT NOT NULL,
//!     sentiment           REAL NOT NULL,
//!     importance          INTEGER NOT NULL,
//!     created_at          TEXT NOT NULL,
//!     last_accessed_at    TEXT,
//!     access_count        INTEGER NOT NULL,
//!     related_agent_id    TEXT,
//!     related_artifact_id TEXT
//! );
//! CREATE TABLE relationships (
//!     id                  TEXT PRIMARY KEY,
//!     agent_id            TEXT NOT NULL,
//!     other_agent_id      TEXT NOT NULL,
//!     kind                TEXT NOT NULL,
//!     familiarity         REAL NOT NULL,
//!     sentiment           REAL NOT NULL,
//!     last_interaction_at TEXT NOT NULL,
//!     history             TEXT NOT NULL,   -- JSON interaction list
//!     UNIQUE(agent_id, other_agent_id)
//! );
//! CREATE TABLE personalities (
//!     agent_id   TEXT PRIMARY KEY,
//!     data       TEXT NOT NULL,            -- JSON PersonalityState
//!     updated_at TEXT NOT NULL
//! );
//! ```
//!
//! `nearest` realizes the vector-search contract (agent-scoped, top-k,
//! similarity floor) with cosine similarity over the stored embeddings.
//! Deployments with a dedicated vector index swap this component out; the
//! call contract is the stable part.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use rusqlite::{Connection, OpenFlags, Row, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PersistenceConfig;
use crate::error::{PawmindError, Result};
use crate::memory::{Memory, MemoryPatch};
use crate::personality::PersonalityState;
use crate::relationship::{Relationship, RelationshipKind};
use crate::types::{AgentId, ArtifactId, Embedding, MemoryId, MemoryKind, RelationshipId};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS memories (
    id                  TEXT PRIMARY KEY,
    agent_id            TEXT NOT NULL,
    content             TEXT NOT NULL,
    embedding           TEXT NOT NULL,
    kind                TEXT NOT NULL,
    sentiment           REAL NOT NULL,
    importance          INTEGER NOT NULL,
    created_at          TEXT NOT NULL,
    last_accessed_at    TEXT,
    access_count        INTEGER NOT NULL,
    related_agent_id    TEXT,
    related_artifact_id TEXT
);
CREATE INDEX IF NOT EXISTS idx_memories_agent ON memories(agent_id);
CREATE INDEX IF NOT EXISTS idx_memories_agent_created
    ON memories(agent_id, created_at DESC);

CREATE TABLE IF NOT EXISTS relationships (
    id                  TEXT PRIMARY KEY,
    agent_id            TEXT NOT NULL,
    other_agent_id      TEXT NOT NULL,
    kind                TEXT NOT NULL,
    familiarity         REAL NOT NULL,
    sentiment           REAL NOT NULL,
    last_interaction_at TEXT NOT NULL,
    history             TEXT NOT NULL,
    UNIQUE(agent_id, other_agent_id)
);
CREATE INDEX IF NOT EXISTS idx_relationships_agent ON relationships(agent_id);

CREATE TABLE IF NOT EXISTS personalities (
    agent_id   TEXT PRIMARY KEY,
    data       TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Handle to an open SQLite database holding the engine's state.
pub struct MemoryStore {
    conn: Connection,
    db_path: PathBuf,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Open (or create) an SQLite database at `path`.
    ///
    /// The schema is created if it does not exist. WAL mode is enabled when
    /// `config.wal_mode` is true.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch(&format!("PRAGMA busy_timeout = {};", config.busy_timeout_ms))?;
        conn.execute_batch(SCHEMA)?;

        info!(path = %db_path.display(), wal = config.wal_mode, "memory store opened");

        Ok(Self { conn, db_path })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ------------------------------------------------------------------
    // Memories
    // ------------------------------------------------------------------

    /// Persist a fully-annotated memory.
    ///
    /// Callers are expected to have clamped fields already; no validation
    /// happens here.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] if the write fails, or
    /// [`PawmindError::Serialization`] if the embedding cannot be encoded.
    pub fn append(&self, memory: &Memory) -> Result<MemoryId> {
        let embedding = serde_json::to_string(&memory.embedding)
            .map_err(|e| PawmindError::Serialization(e.to_string()))?;

        self.conn.execute(
            "INSERT INTO memories (
                id, agent_id, content, embedding, kind, sentiment, importance,
                created_at, last_accessed_at, access_count,
                related_agent_id, related_artifact_id
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                memory.id.0.to_string(),
                memory.agent_id.0.to_string(),
                memory.content,
                embedding,
                memory.kind.as_str(),
                f64::from(memory.sentiment),
                i64::from(memory.importance),
                memory.created_at.to_rfc3339(),
                memory.last_accessed_at.map(|t| t.to_rfc3339()),
                i64::from(memory.access_count),
                memory.related_agent_id.map(|a| a.0.to_string()),
                memory.related_artifact_id.map(|a| a.0.to_string()),
            ],
        )?;

        debug!(memory = %memory.id, agent = %memory.agent_id, "memory appended");
        Ok(memory.id)
    }

    /// Load a single memory by id.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn memory(&self, id: MemoryId) -> Result<Option<Memory>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM memories WHERE id = ?1")?;
        let result = stmt
            .query_row(params![id.0.to_string()], row_to_memory)
            .optional()?;
        Ok(result)
    }

    /// The `k` memories most similar to `query`, most similar first.
    ///
    /// Only memories belonging to `agent_id` with cosine similarity of at
    /// least `min_similarity` are returned; the result is empty when none
    /// clears the floor.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn nearest(
        &self,
        agent_id: AgentId,
        query: &Embedding,
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<Memory>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM memories WHERE agent_id = ?1")?;
        let rows = stmt.query_map(params![agent_id.0.to_string()], row_to_memory)?;

        let mut scored: Vec<(OrderedFloat<f32>, Memory)> = Vec::new();
        for row in rows {
            let memory = row?;
            let similarity = query.cosine_similarity(&memory.embedding);
            if similarity >= min_similarity {
                scored.push((OrderedFloat(similarity), memory));
            }
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(k);

        debug!(agent = %agent_id, hits = scored.len(), k, "nearest query");
        Ok(scored.into_iter().map(|(_, m)| m).collect())
    }

    /// All memories of an agent, ordered by importance descending with ties
    /// broken by creation time descending. Inspection/UI surface, not part
    /// of the learning logic.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn all(&self, agent_id: AgentId) -> Result<Vec<Memory>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM memories WHERE agent_id = ?1
             ORDER BY importance DESC, created_at DESC",
        )?;
        let rows = stmt.query_map(params![agent_id.0.to_string()], row_to_memory)?;
        rows.map(|r| r.map_err(PawmindError::from)).collect()
    }

    /// The agent's most recent memories by creation time, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn recent(&self, agent_id: AgentId, limit: usize) -> Result<Vec<Memory>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM memories WHERE agent_id = ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![agent_id.0.to_string(), limit as i64], row_to_memory)?;
        rows.map(|r| r.map_err(PawmindError::from)).collect()
    }

    /// Total number of memories recorded for an agent.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn count(&self, agent_id: AgentId) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM memories WHERE agent_id = ?1",
            params![agent_id.0.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Apply a partial update to a memory. Used by the recall reinforcer.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::MemoryNotFound`] if the id is unknown, or
    /// [`PawmindError::Storage`] on SQLite failures.
    pub fn update(&self, id: MemoryId, patch: &MemoryPatch) -> Result<()> {
        let mut memory = self.memory(id)?.ok_or(PawmindError::MemoryNotFound(id))?;
        patch.apply(&mut memory);

        self.conn.execute(
            "UPDATE memories
             SET importance = ?2, access_count = ?3, last_accessed_at = ?4
             WHERE id = ?1",
            params![
                id.0.to_string(),
                i64::from(memory.importance),
                i64::from(memory.access_count),
                memory.last_accessed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Relationships
    // ------------------------------------------------------------------

    /// Load the relationship for an ordered pair, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn relationship(
        &self,
        agent_id: AgentId,
        other_agent_id: AgentId,
    ) -> Result<Option<Relationship>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM relationships WHERE agent_id = ?1 AND other_agent_id = ?2",
        )?;
        let result = stmt
            .query_row(
                params![agent_id.0.to_string(), other_agent_id.0.to_string()],
                row_to_relationship,
            )
            .optional()?;
        Ok(result)
    }

    /// Insert or overwrite a relationship row. The unique constraint on the
    /// ordered pair keeps at most one row per direction.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures, or
    /// [`PawmindError::Serialization`] if the history cannot be encoded.
    pub fn upsert_relationship(&self, relationship: &Relationship) -> Result<()> {
        let history = serde_json::to_string(&relationship.history)
            .map_err(|e| PawmindError::Serialization(e.to_string()))?;

        self.conn.execute(
            "INSERT INTO relationships (
                id, agent_id, other_agent_id, kind, familiarity, sentiment,
                last_interaction_at, history
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(agent_id, other_agent_id) DO UPDATE SET
                familiarity = excluded.familiarity,
                sentiment = excluded.sentiment,
                last_interaction_at = excluded.last_interaction_at,
                history = excluded.history",
            params![
                relationship.id.0.to_string(),
                relationship.agent_id.0.to_string(),
                relationship.other_agent_id.0.to_string(),
                relationship.kind.as_str(),
                f64::from(relationship.familiarity),
                f64::from(relationship.sentiment),
                relationship.last_interaction_at.to_rfc3339(),
                history,
            ],
        )?;

        debug!(
            agent = %relationship.agent_id,
            other = %relationship.other_agent_id,
            familiarity = relationship.familiarity,
            "relationship upserted"
        );
        Ok(())
    }

    /// All relationships held by an agent, ordered by familiarity descending.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures.
    pub fn relationships(&self, agent_id: AgentId) -> Result<Vec<Relationship>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM relationships WHERE agent_id = ?1 ORDER BY familiarity DESC",
        )?;
        let rows = stmt.query_map(params![agent_id.0.to_string()], row_to_relationship)?;
        rows.map(|r| r.map_err(PawmindError::from)).collect()
    }

    // ------------------------------------------------------------------
    // Personality
    // ------------------------------------------------------------------

    /// Load an agent's personality state.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures, or
    /// [`PawmindError::Serialization`] if the stored JSON is invalid.
    pub fn personality(&self, agent_id: AgentId) -> Result<Option<PersonalityState>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT data FROM personalities WHERE agent_id = ?1")?;
        let data: Option<String> = stmt
            .query_row(params![agent_id.0.to_string()], |row| row.get(0))
            .optional()?;

        let Some(data) = data else {
            return Ok(None);
        };
        let state = serde_json::from_str(&data)
            .map_err(|e| PawmindError::Serialization(e.to_string()))?;
        Ok(Some(state))
    }

    /// Save (upsert) an agent's personality state.
    ///
    /// # Errors
    ///
    /// Returns [`PawmindError::Storage`] on SQLite failures, or
    /// [`PawmindError::Serialization`] if the state cannot be encoded.
    pub fn save_personality(&self, state: &PersonalityState) -> Result<()> {
        let data = serde_json::to_string(state)
            .map_err(|e| PawmindError::Serialization(e.to_string()))?;

        self.conn.execute(
            "INSERT INTO personalities (agent_id, data, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(agent_id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at",
            params![
                state.agent_id.0.to_string(),
                data,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn conversion_err<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_uuid(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| conversion_err(idx, e))
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

fn row_to_memory(row: &Row<'_>) -> rusqlite::Result<Memory> {
    let id: String = row.get("id")?;
    let agent_id: String = row.get("agent_id")?;
    let embedding: String = row.get("embedding")?;
    let kind: String = row.get("kind")?;
    let created_at: String = row.get("created_at")?;
    let last_accessed_at: Option<String> = row.get("last_accessed_at")?;
    let related_agent_id: Option<String> = row.get("related_agent_id")?;
    let related_artifact_id: Option<String> = row.get("related_artifact_id")?;

    let embedding: Embedding =
        serde_json::from_str(&embedding).map_err(|e| conversion_err(3, e))?;
    let kind: MemoryKind = kind
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            e.into(),
        ))?;

    Ok(Memory {
        id: MemoryId(parse_uuid(0, &id)?),
        agent_id: AgentId(parse_uuid(1, &agent_id)?),
        content: row.get("content")?,
        embedding,
        kind,
        sentiment: row.get::<_, f64>("sentiment")? as f32,
        importance: row.get::<_, i64>("importance")? as u8,
        created_at: parse_timestamp(7, &created_at)?,
        last_accessed_at: match last_accessed_at {
            Some(s) => Some(parse_timestamp(8, &s)?),
            None => None,
        },
        access_count: row.get::<_, i64>("access_count")? as u32,
        related_agent_id: match related_agent_id {
            Some(s) => Some(AgentId(parse_uuid(10, &s)?)),
            None => None,
        },
        related_artifact_id: match related_artifact_id {
            Some(s) => Some(ArtifactId(parse_uuid(11, &s)?)),
            None => None,
        },
    })
}

fn row_to_relationship(row: &Row<'_>) -> rusqlite::Result<Relationship> {
    let id: String = row.get("id")?;
    let agent_id: String = row.get("agent_id")?;
    let other_agent_id: String = row.get("other_agent_id")?;
    let kind: String = row.get("kind")?;
    let last_interaction_at: String = row.get("last_interaction_at")?;
    let history: String = row.get("history")?;

    let kind: RelationshipKind = kind
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            e.into(),
        ))?;
    let history = serde_json::from_str(&history).map_err(|e| conversion_err(7, e))?;

    Ok(Relationship {
        id: RelationshipId(parse_uuid(0, &id)?),
        agent_id: AgentId(parse_uuid(1, &agent_id)?),
        other_agent_id: AgentId(parse_uuid(2, &other_agent_id)?),
        kind,
        familiarity: row.get::<_, f64>("familiarity")? as f32,
        sentiment: row.get::<_, f64>("sentiment")? as f32,
        last_interaction_at: parse_timestamp(6, &last_interaction_at)?,
        history,
    })
}

/// Extension trait that adds an `.optional()` combinator to `rusqlite::Result`.
///
/// Converts `Err(QueryReturnedNoRows)` into `Ok(None)`.
trait OptionalExt<T> {
    /// Convert `QueryReturnedNoRows` into `Ok(None)`.
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
