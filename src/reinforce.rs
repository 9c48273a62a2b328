//! Retrieval recency/frequency reinforcement.
//!
//! Every memory returned by `recall` passes through [`reinforce`]: stale
//! memories decay, frequently-recalled memories strengthen, and access
//! metadata is updated unconditionally. The two importance branches are
//! mutually exclusive per recall event.

use chrono::{DateTime, Utc};

use crate::config::ReinforcementConfig;
use crate::memory::{Memory, MemoryPatch};

/// Compute the reinforcement patch for a recalled memory.
///
/// `days_since_access` counts whole days since the memory was last accessed
/// (falling back to its creation time). Beyond the staleness window the
/// importance drops by one (floored at 1); otherwise, if the pre-increment
/// access count exceeds the frequency threshold, importance rises by one
/// (capped at 10). Access count and last-accessed time always advance.
#[must_use]
pub fn reinforce(memory: &Memory, now: DateTime<Utc>, config: &ReinforcementConfig) -> MemoryPatch {
    let reference = memory.last_accessed_at.unwrap_or(memory.created_at);
    let days_since_access = (now - reference).num_days();

    let importance = if days_since_access > config.stale_days {
        Some(memory.importance.saturating_sub(1).max(1))
    } else if memory.access_count > config.frequent_access_count {
        Some((memory.importance + 1).min(10))
    } else {
        None
    };

    MemoryPatch {
        importance,
        access_count: Some(memory.access_count + 1),
        last_accessed_at: Some(now),
    }
}
