//! Embedding providers.
//!
//! The engine only sees `rerag_core::traits::Embedder`; this crate supplies
//! the deterministic hashing provider used for offline operation and tests.
//! A model-backed provider plugs in at `default_embedder` without touching
//! the indexes.

use std::hash::{Hash, Hasher};

use tracing::debug;
use twox_hash::XxHash64;

use rerag_core::error::Result;
use rerag_core::traits::Embedder;

pub const DEFAULT_DIM: usize = 384;

/// Deterministic bag-of-hashed-tokens embedder.
///
/// Each whitespace token hashes to a slot; the hash's high bits contribute
/// the slot value, with a small positional term so token order matters
/// slightly. Vectors are L2-normalized, so inner product equals cosine
/// similarity. Same text in, same vector out, always.
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += val + (i % 3) as f32 * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIM)
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!(batch = texts.len(), dim = self.dim, "embedding batch");
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Provider selection seam. Only the hashing provider ships in-tree; a
/// model-backed provider would be chosen here.
pub fn default_embedder() -> Result<Box<dyn Embedder>> {
    Ok(Box::new(HashingEmbedder::default()))
}
