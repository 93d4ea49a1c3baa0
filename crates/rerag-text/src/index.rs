//! Inverted index with BM25 ranking.
//!
//! Corpus statistics (document frequencies, average document length) come
//! from the whole chunk set, which makes construction a batch operation:
//! there is no incremental add.

use std::collections::HashMap;

use tracing::{debug, info};

use rerag_core::error::{Error, Result};
use rerag_core::traits::SparseIndexer;
use rerag_core::types::{Chunk, ChunkId, RetrievalType, SearchHit};

use crate::tokenize::tokenize;

// rank-bm25 defaults; saturation via k1, length normalization via b.
const K1: f32 = 1.5;
const B: f32 = 0.75;

/// Term postings: (document ordinal, term frequency), sorted by ordinal.
type Postings = Vec<(u32, u32)>;

#[derive(Debug)]
pub struct Bm25Index {
    postings: HashMap<String, Postings>,
    doc_ids: Vec<ChunkId>,
    doc_len: Vec<u32>,
    avg_doc_len: f32,
}

impl Bm25Index {
    /// IDF in the always-positive Lucene form.
    fn idf(&self, df: usize) -> f32 {
        let n = self.doc_ids.len() as f32;
        (1.0 + (n - df as f32 + 0.5) / (df as f32 + 0.5)).ln()
    }
}

impl SparseIndexer for Bm25Index {
    fn build(chunks: &[Chunk]) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let mut postings: HashMap<String, Postings> = HashMap::new();
        let mut doc_ids = Vec::with_capacity(chunks.len());
        let mut doc_len = Vec::with_capacity(chunks.len());

        for (ordinal, chunk) in chunks.iter().enumerate() {
            let tokens = tokenize(&chunk.text);
            doc_ids.push(chunk.id.clone());
            doc_len.push(tokens.len() as u32);

            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *tf.entry(token).or_insert(0) += 1;
            }
            for (token, count) in tf {
                postings.entry(token).or_default().push((ordinal as u32, count));
            }
        }

        let total_len: u64 = doc_len.iter().map(|&l| u64::from(l)).sum();
        let avg_doc_len = (total_len as f32 / doc_len.len() as f32).max(1.0);

        info!(
            documents = doc_ids.len(),
            terms = postings.len(),
            avg_doc_len,
            "built BM25 index"
        );
        Ok(Self { postings, doc_ids, doc_len, avg_doc_len })
    }

    fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be at least 1".to_string()));
        }

        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            debug!(query, "no usable tokens in query");
            return Ok(Vec::new());
        }

        // Score only documents containing at least one query term.
        let mut scores: HashMap<u32, f32> = HashMap::new();
        for token in &query_tokens {
            let Some(postings) = self.postings.get(token) else { continue };
            let idf = self.idf(postings.len());
            for &(ordinal, tf) in postings {
                let tf = tf as f32;
                let len_norm =
                    1.0 - B + B * (self.doc_len[ordinal as usize] as f32 / self.avg_doc_len);
                let term_score = idf * (tf * (K1 + 1.0)) / (tf + K1 * len_norm);
                *scores.entry(ordinal).or_insert(0.0) += term_score;
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .map(|(ordinal, score)| SearchHit {
                id: self.doc_ids[ordinal as usize].clone(),
                score,
                source: RetrievalType::Sparse,
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);
        debug!(query, hits = hits.len(), "BM25 search");
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.doc_ids.len()
    }
}
