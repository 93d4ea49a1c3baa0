//! The hybrid retrieval engine.
//!
//! Both indexes are immutable once built and queried concurrently without
//! locking. A rebuild constructs new indexes completely off to the side and
//! then republishes the handle atomically: in-flight queries see the old
//! version or the new one, never a partial build, and a failed rebuild
//! leaves the previously published version servable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{info, warn};

use rerag_core::config::RetrievalConfig;
use rerag_core::error::{Error, Result};
use rerag_core::traits::{DenseIndexer, Embedder, SparseIndexer};
use rerag_core::types::{
    validate, Chunk, ChunkId, RetrievalResult, RetrievalType, ScoredChunk, SearchHit, Strategy,
};

use crate::classify::{classify, QueryProfile};
use crate::router::{choose_strategy, fuse, single_path, FusedHit, RoutingDecision};

/// One immutable, fully built corpus version.
pub struct CorpusIndex<S, D> {
    chunks: HashMap<ChunkId, Chunk>,
    sparse: S,
    dense: D,
    version: u64,
}

impl<S, D> CorpusIndex<S, D> {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

pub struct HybridRetriever<S, D>
where
    S: SparseIndexer,
    D: DenseIndexer,
{
    embedder: Box<dyn Embedder>,
    config: RetrievalConfig,
    current: RwLock<Option<Arc<CorpusIndex<S, D>>>>,
    build_lock: Mutex<()>,
    next_version: AtomicU64,
}

/// The default engine over the in-tree index implementations.
pub type RetrievalEngine = HybridRetriever<rerag_text::Bm25Index, rerag_vector::DenseIndex>;

impl<S, D> HybridRetriever<S, D>
where
    S: SparseIndexer,
    D: DenseIndexer,
{
    pub fn new(embedder: Box<dyn Embedder>, config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            embedder,
            config,
            current: RwLock::new(None),
            build_lock: Mutex::new(()),
            next_version: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Build and atomically publish a new corpus version.
    ///
    /// Exclusive with concurrent builds; queries keep running against the
    /// previous version until the swap. Any error here leaves that version
    /// untouched.
    pub fn build_corpus(&self, chunks: Vec<Chunk>) -> Result<u64> {
        let _build_guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);

        validate(&chunks)?;
        let sparse = S::build(&chunks)?;
        let dense = D::build(&chunks, self.embedder.as_ref())?;

        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        let index = Arc::new(CorpusIndex {
            chunks: chunks.into_iter().map(|c| (c.id.clone(), c)).collect(),
            sparse,
            dense,
            version,
        });
        let chunk_count = index.chunk_count();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(index);
        info!(version, chunks = chunk_count, "published corpus index");
        Ok(version)
    }

    fn snapshot(&self) -> Result<Arc<CorpusIndex<S, D>>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::IndexNotReady("hybrid"))
    }

    /// Route a query with the engine's configured options.
    pub fn route(&self, query: &str) -> Result<RetrievalResult> {
        self.route_with_config(query, &self.config)
    }

    /// Route a query with per-call options.
    pub fn route_with_config(
        &self,
        query: &str,
        config: &RetrievalConfig,
    ) -> Result<RetrievalResult> {
        config.validate()?;
        let profile = classify(query);
        let decision = choose_strategy(&profile, config);
        self.execute(query, &profile, decision, config)
    }

    /// Explicit strategy override, the only way to reach DenseOnly.
    pub fn route_with_strategy(&self, query: &str, strategy: Strategy) -> Result<RetrievalResult> {
        let profile = classify(query);
        let (dense_weight, sparse_weight) = match strategy {
            Strategy::DenseOnly => (1.0, 0.0),
            Strategy::SparseOnly => (0.0, 1.0),
            Strategy::Fusion => (self.config.dense_weight, self.config.sparse_weight),
        };
        let decision = RoutingDecision {
            strategy,
            dense_weight,
            sparse_weight,
            rationale: format!("explicit {strategy} override"),
        };
        self.execute(query, &profile, decision, &self.config)
    }

    fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embedder.embed_batch(&[query.to_string()])?;
        if vectors.is_empty() {
            return Err(Error::Embedding("embedder returned no vector for query".to_string()));
        }
        Ok(vectors.remove(0))
    }

    fn execute(
        &self,
        query: &str,
        profile: &QueryProfile,
        decision: RoutingDecision,
        config: &RetrievalConfig,
    ) -> Result<RetrievalResult> {
        let index = self.snapshot()?;

        let (fused, dense_count, sparse_count): (Vec<FusedHit>, usize, usize) =
            match decision.strategy {
                Strategy::SparseOnly => {
                    let hits = index.sparse.search(query, config.max_sparse_results)?;
                    let count = hits.len();
                    (single_path(&hits, RetrievalType::Sparse), 0, count)
                }
                Strategy::DenseOnly => {
                    let query_vec = self.embed_query(query)?;
                    let hits = index.dense.search(&query_vec, config.max_dense_results)?;
                    let count = hits.len();
                    (single_path(&hits, RetrievalType::Dense), count, 0)
                }
                Strategy::Fusion => {
                    let query_vec = self.embed_query(query)?;
                    let dense_hits: Vec<SearchHit> =
                        index.dense.search(&query_vec, config.max_dense_results)?;
                    let sparse_hits = index.sparse.search(query, config.max_sparse_results)?;
                    let fused = fuse(
                        &dense_hits,
                        &sparse_hits,
                        decision.dense_weight,
                        decision.sparse_weight,
                    );
                    (fused, dense_hits.len(), sparse_hits.len())
                }
            };

        let mut results = Vec::with_capacity(fused.len().min(config.final_top_k));
        for hit in fused.into_iter().take(config.final_top_k) {
            // Index and chunk store move in lock-step inside one version; a
            // miss here is a consistency failure, not a recoverable state.
            let Some(chunk) = index.chunks.get(&hit.id) else {
                warn!(id = %hit.id, version = index.version, "hit without a backing chunk");
                return Err(Error::IndexNotReady("hybrid"));
            };
            results.push(ScoredChunk {
                chunk: chunk.clone(),
                score: hit.score,
                dense_score: hit.dense_score,
                sparse_score: hit.sparse_score,
                retrieval_types: hit.retrieval_types,
            });
        }

        let reasoning = if results.is_empty() {
            "no matching documents".to_string()
        } else {
            let mut reasoning = format!(
                "{}; intent {} (confidence {:.2}); {} dense + {} sparse hits -> {} results",
                decision.rationale,
                profile.intent,
                profile.confidence,
                dense_count,
                sparse_count,
                results.len()
            );
            if !profile.entities.is_empty() {
                let entities: Vec<String> =
                    profile.entities.iter().map(|(k, v)| format!("{k}={v}")).collect();
                reasoning.push_str(&format!("; entities: {}", entities.join(", ")));
            }
            reasoning
        };
        info!(
            strategy = %decision.strategy,
            dense_count,
            sparse_count,
            results = results.len(),
            "routed query"
        );

        Ok(RetrievalResult {
            results,
            strategy: decision.strategy,
            dense_weight: decision.dense_weight,
            sparse_weight: decision.sparse_weight,
            dense_count,
            sparse_count,
            reasoning,
        })
    }
}
