use crate::error::Result;
use crate::types::{Chunk, SearchHit};

/// External embedding collaborator. Implementations must be deterministic
/// and dimension-stable across calls within one build.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Lexical (BM25-style) index. Built once per corpus, immutable afterwards.
pub trait SparseIndexer: Send + Sync + Sized {
    fn build(chunks: &[Chunk]) -> Result<Self>;
    fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Vector index over chunk embeddings. Built once per corpus, immutable
/// afterwards; queries take an already-embedded vector.
pub trait DenseIndexer: Send + Sync + Sized {
    fn build(chunks: &[Chunk], embedder: &dyn Embedder) -> Result<Self>;
    fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
