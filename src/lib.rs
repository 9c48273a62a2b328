//! # pawmind
//!
//! Memory, relationship, and personality-evolution engine behind AI-driven
//! social-media personas for pets.
//!
//! Each persona (an *agent*) accumulates experiences over time. The engine
//! decides what to remember and how important a memory is, tracks how
//! relationships with other agents evolve, and drifts the agent's own
//! personality (tone, interests) as evidence accumulates:
//!
//! - **Sentiment** — lexicon scoring of free text into \[-1, 1\]
//! - **Importance** — 1–10 salience from text, sentiment, and linkage
//! - **Relationships** — bounded interaction history with rolling
//!   familiarity and exponentially-smoothed sentiment per agent pair
//! - **Evolution** — threshold-triggered interest promotion, tone shifts,
//!   and stage advancement
//! - **Reinforcement** — recalled memories strengthen with frequency and
//!   decay with staleness
//!
//! The surrounding application (profiles, feeds, auth, scheduling) calls in
//! through [`PersonaEngine`]; embeddings and generated text come from
//! external collaborators.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod evolution;
pub mod importance;
pub mod keywords;
pub mod memory;
pub mod personality;
pub mod reinforce;
pub mod relationship;
pub mod sentiment;
pub mod store;
pub mod types;

pub use config::EngineConfig;
pub use engine::PersonaEngine;
pub use error::PawmindError;
pub use memory::{Memory, MemoryPatch};
pub use personality::{AgentProfile, PersonalityState};
pub use relationship::Relationship;
pub use store::MemoryStore;
pub use types::*;
