use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use rerag_core::error::{Error, Result};
use rerag_core::traits::{DenseIndexer, Embedder};
use rerag_core::types::{Chunk, ChunkId, RetrievalType, SearchHit};

const EMBED_BATCH: usize = 64;

/// Chunk ids and their embeddings in lock-step parallel arrays.
///
/// `ids[i]` owns `vectors[i]`; a length mismatch is a construction bug, so
/// both arrays are only ever pushed together.
#[derive(Debug)]
pub struct DenseIndex {
    ids: Vec<ChunkId>,
    vectors: Vec<Vec<f32>>,
    dim: usize,
}

impl DenseIndex {
    pub fn dim(&self) -> usize {
        self.dim
    }
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-12);
    for x in v {
        *x /= norm;
    }
}

impl DenseIndexer for DenseIndex {
    fn build(chunks: &[Chunk], embedder: &dyn Embedder) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let dim = embedder.dim();

        let pb = ProgressBar::new(chunks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks embedded")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut ids = Vec::with_capacity(chunks.len());
        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = embedder.embed_batch(&texts)?;
            if embeddings.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    embeddings.len(),
                    batch.len()
                )));
            }
            for (chunk, mut vector) in batch.iter().zip(embeddings) {
                if vector.len() != dim {
                    return Err(Error::Embedding(format!(
                        "vector for chunk '{}' has dimension {}, expected {}",
                        chunk.id,
                        vector.len(),
                        dim
                    )));
                }
                l2_normalize(&mut vector);
                ids.push(chunk.id.clone());
                vectors.push(vector);
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        info!(documents = ids.len(), dim, "built dense index");
        Ok(Self { ids, vectors, dim })
    }

    fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be at least 1".to_string()));
        }
        if query_vec.len() != self.dim {
            return Err(Error::InvalidArgument(format!(
                "query vector has dimension {}, index expects {}",
                query_vec.len(),
                self.dim
            )));
        }

        let mut query = query_vec.to_vec();
        l2_normalize(&mut query);

        let mut hits: Vec<SearchHit> = self
            .ids
            .iter()
            .zip(&self.vectors)
            .map(|(id, vector)| SearchHit {
                id: id.clone(),
                score: query.iter().zip(vector).map(|(a, b)| a * b).sum(),
                source: RetrievalType::Dense,
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);
        debug!(hits = hits.len(), "dense search");
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}
