//! Strategy selection and score fusion.
//!
//! Dense similarity and BM25 live on incomparable scales, so each path's
//! scores are min-max normalized within that path's own result set before
//! weighting. Normalization is per-query: scores are comparable within one
//! response, not across responses. Swapping in a corpus-calibrated scale
//! means replacing `min_max_normalize` only.

use std::collections::BTreeMap;

use tracing::debug;

use rerag_core::config::RetrievalConfig;
use rerag_core::types::{ChunkId, RetrievalType, SearchHit, Strategy};

use crate::classify::{IntentCategory, QueryProfile};

// Statistic chunks are rare and phrased unlike the queries that want them,
// so aggregation queries lean hard on the semantic path.
const STATISTIC_DENSE_WEIGHT: f32 = 0.8;
const STATISTIC_SPARSE_WEIGHT: f32 = 0.2;

/// The branch the router settled on, with the weights it will apply and the
/// rationale reported back to the caller.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub strategy: Strategy,
    pub dense_weight: f32,
    pub sparse_weight: f32,
    pub rationale: String,
}

/// Pick a strategy from the query profile.
///
/// Exact-identifier queries are lexical by nature: dense embeddings blur
/// registration numbers, so a confident factual lookup goes sparse-only.
/// DenseOnly is never chosen here; it is reachable only through the explicit
/// override entry point on the engine.
pub fn choose_strategy(profile: &QueryProfile, config: &RetrievalConfig) -> RoutingDecision {
    match profile.intent {
        IntentCategory::FactualLookup if profile.confidence >= config.routing_threshold => {
            RoutingDecision {
                strategy: Strategy::SparseOnly,
                dense_weight: 0.0,
                sparse_weight: 1.0,
                rationale: format!(
                    "factual lookup at confidence {:.2} >= threshold {:.2}: exact identifiers \
                     match lexically, sparse path only",
                    profile.confidence, config.routing_threshold
                ),
            }
        }
        IntentCategory::AggregationStatistic => RoutingDecision {
            strategy: Strategy::Fusion,
            dense_weight: STATISTIC_DENSE_WEIGHT,
            sparse_weight: STATISTIC_SPARSE_WEIGHT,
            rationale: format!(
                "aggregation/statistic query: fusion with dense weight boosted to {:.1}/{:.1}",
                STATISTIC_DENSE_WEIGHT, STATISTIC_SPARSE_WEIGHT
            ),
        },
        _ => RoutingDecision {
            strategy: Strategy::Fusion,
            dense_weight: config.dense_weight,
            sparse_weight: config.sparse_weight,
            rationale: format!(
                "{} query at confidence {:.2}: default fusion {:.1}/{:.1}",
                profile.intent, profile.confidence, config.dense_weight, config.sparse_weight
            ),
        },
    }
}

/// Min-max scale scores into [0, 1] within one result set. A degenerate set
/// where every score is equal maps to 1.0 for each entry.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }
    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max > min {
        scores.iter().map(|s| (s - min) / (max - min)).collect()
    } else {
        vec![1.0; scores.len()]
    }
}

/// One fused entry before chunk hydration.
#[derive(Debug, Clone)]
pub struct FusedHit {
    pub id: ChunkId,
    pub score: f32,
    pub dense_score: f32,
    pub sparse_score: f32,
    pub retrieval_types: Vec<RetrievalType>,
}

/// Merge the two paths into one deduplicated ranking.
///
/// `final = dense_weight * norm_dense + sparse_weight * norm_sparse`; a
/// chunk absent from one path contributes 0 for that path but stays
/// eligible, which is where hybrid recall comes from. The merge is
/// commutative: feeding the paths in either order yields the same ranking.
pub fn fuse(
    dense: &[SearchHit],
    sparse: &[SearchHit],
    dense_weight: f32,
    sparse_weight: f32,
) -> Vec<FusedHit> {
    let dense_norm = min_max_normalize(&dense.iter().map(|h| h.score).collect::<Vec<_>>());
    let sparse_norm = min_max_normalize(&sparse.iter().map(|h| h.score).collect::<Vec<_>>());

    let mut merged: BTreeMap<&str, FusedHit> = BTreeMap::new();
    for (hit, &norm) in dense.iter().zip(&dense_norm) {
        merged.insert(
            hit.id.as_str(),
            FusedHit {
                id: hit.id.clone(),
                score: dense_weight * norm,
                dense_score: norm,
                sparse_score: 0.0,
                retrieval_types: vec![RetrievalType::Dense],
            },
        );
    }
    for (hit, &norm) in sparse.iter().zip(&sparse_norm) {
        merged
            .entry(hit.id.as_str())
            .and_modify(|fused| {
                fused.score += sparse_weight * norm;
                fused.sparse_score = norm;
                fused.retrieval_types.push(RetrievalType::Sparse);
            })
            .or_insert_with(|| FusedHit {
                id: hit.id.clone(),
                score: sparse_weight * norm,
                dense_score: 0.0,
                sparse_score: norm,
                retrieval_types: vec![RetrievalType::Sparse],
            });
    }

    let mut fused: Vec<FusedHit> = merged.into_values().collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    debug!(dense = dense.len(), sparse = sparse.len(), fused = fused.len(), "fused result paths");
    fused
}

/// Normalize a single-path result into the fused shape, so SparseOnly and
/// DenseOnly responses report final scores on the same [0, 1] scale.
pub fn single_path(hits: &[SearchHit], path: RetrievalType) -> Vec<FusedHit> {
    let normalized = min_max_normalize(&hits.iter().map(|h| h.score).collect::<Vec<_>>());
    hits.iter()
        .zip(&normalized)
        .map(|(hit, &norm)| FusedHit {
            id: hit.id.clone(),
            score: norm,
            dense_score: if path == RetrievalType::Dense { norm } else { 0.0 },
            sparse_score: if path == RetrievalType::Sparse { norm } else { 0.0 },
            retrieval_types: vec![path],
        })
        .collect()
}
