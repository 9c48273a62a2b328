//! Error types for the pawmind engine.

use thiserror::Error;

use crate::types::{AgentId, MemoryId};

/// Top-level error type for all engine operations.
#[derive(Error, Debug)]
pub enum PawmindError {
    /// Malformed input, rejected before any persistence.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A memory with the given ID was not found.
    #[error("Memory not found: {0}")]
    MemoryNotFound(MemoryId),

    /// No personality state exists for the given agent.
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// SQLite persistence error.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding provider failure.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PawmindError>;
