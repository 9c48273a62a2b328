//! Vector embedding abstraction.
//!
//! The engine never computes real embeddings itself; an external collaborator
//! does. This module defines the trait that collaborator implements, plus two
//! in-process providers: a zero-vector stub and a deterministic bag-of-words
//! hasher that gives tests meaningful similarity without a model.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::types::Embedding;

/// Generate vector embeddings from text.
///
/// Implementations must be `Send + Sync` so the engine can be shared across
/// request-handling threads.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into `dimensions()` floats.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PawmindError::Embedding`] if the provider fails to
    /// produce a vector.
    fn embed(&self, text: &str) -> Result<Embedding>;

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// A human-readable name for the model.
    fn model_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Stub provider
// ---------------------------------------------------------------------------

/// A stub provider that returns zero-vectors. Useful for tests that never
/// exercise retrieval.
pub struct StubEmbeddingProvider {
    dims: usize,
}

impl StubEmbeddingProvider {
    /// Create a new stub provider with the given dimensionality.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dims: dimensions }
    }
}

impl Default for StubEmbeddingProvider {
    fn default() -> Self {
        Self::new(384)
    }
}

impl EmbeddingProvider for StubEmbeddingProvider {
    fn embed(&self, _text: &str) -> Result<Embedding> {
        Ok(Embedding(vec![0.0; self.dims]))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn model_name(&self) -> &str {
        "stub-zero-vector"
    }
}

// ---------------------------------------------------------------------------
// Deterministic hashed provider
// ---------------------------------------------------------------------------

/// A deterministic bag-of-words provider: each lowercased word is hashed
/// into a bucket and the resulting vector is L2-normalized.
///
/// Identical texts embed identically, and texts sharing words land close in
/// cosine space — enough structure for integration tests and for the
/// keyword-match fallback profile, with no model download.
pub struct HashedEmbeddingProvider {
    dims: usize,
}

impl HashedEmbeddingProvider {
    /// Create a new hashed provider.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dims: dimensions }
    }
}

impl Default for HashedEmbeddingProvider {
    fn default() -> Self {
        Self::new(384)
    }
}

impl EmbeddingProvider for HashedEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let mut raw = vec![0.0_f32; self.dims];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dims as u64) as usize;
            raw[bucket] += 1.0;
        }

        let mag: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
        if mag < f32::EPSILON {
            return Ok(Embedding(raw));
        }
        for x in &mut raw {
            *x /= mag;
        }
        Ok(Embedding(raw))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn model_name(&self) -> &str {
        "hashed-bag-of-words"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_provider_returns_zeros() {
        let provider = StubEmbeddingProvider::new(4);
        let emb = provider.embed("hello").expect("embed");
        assert_eq!(emb.0.len(), 4);
        assert!(emb.0.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn hashed_provider_is_deterministic() {
        let provider = HashedEmbeddingProvider::new(64);
        let a = provider.embed("squirrels in the oak tree").expect("embed");
        let b = provider.embed("squirrels in the oak tree").expect("embed");
        assert_eq!(a, b);
    }

    #[test]
    fn hashed_provider_returns_unit_vectors() {
        let provider = HashedEmbeddingProvider::new(64);
        let emb = provider.embed("a walk in the park").expect("embed");
        let mag: f32 = emb.0.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((mag - 1.0).abs() < 0.01, "expected unit vector, got {mag}");
    }

    #[test]
    fn shared_words_mean_higher_similarity() {
        let provider = HashedEmbeddingProvider::new(128);
        let a = provider.embed("hiking the mountain trail").expect("embed");
        let b = provider.embed("hiking the forest trail").expect("embed");
        let c = provider.embed("napping on the windowsill").expect("embed");
        assert!(a.cosine_similarity(&b) > a.cosine_similarity(&c));
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let provider = HashedEmbeddingProvider::new(16);
        let emb = provider.embed("").expect("embed");
        assert!(emb.0.iter().all(|&x| x == 0.0));
    }
}
