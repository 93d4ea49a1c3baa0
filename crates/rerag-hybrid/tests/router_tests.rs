use rerag_core::config::RetrievalConfig;
use rerag_core::types::{RetrievalType, SearchHit, Strategy};
use rerag_hybrid::classify::{IntentCategory, QueryProfile};
use rerag_hybrid::router::{choose_strategy, fuse, min_max_normalize, single_path};

fn hit(id: &str, score: f32, source: RetrievalType) -> SearchHit {
    SearchHit { id: id.to_string(), score, source }
}

fn profile(intent: IntentCategory, confidence: f32) -> QueryProfile {
    QueryProfile { intent, entities: Default::default(), confidence }
}

#[test]
fn normalize_scales_into_unit_interval() {
    let normalized = min_max_normalize(&[2.0, 1.0, 0.0]);
    assert_eq!(normalized, vec![1.0, 0.5, 0.0]);
}

#[test]
fn normalize_handles_degenerate_sets() {
    assert!(min_max_normalize(&[]).is_empty());
    assert_eq!(min_max_normalize(&[3.7]), vec![1.0]);
    assert_eq!(min_max_normalize(&[0.4, 0.4, 0.4]), vec![1.0, 1.0, 1.0]);
}

#[test]
fn confident_factual_lookup_goes_sparse_only() {
    let config = RetrievalConfig::default();
    let decision = choose_strategy(&profile(IntentCategory::FactualLookup, 1.0), &config);
    assert_eq!(decision.strategy, Strategy::SparseOnly);
    assert_eq!(decision.sparse_weight, 1.0);
}

#[test]
fn unconfident_factual_lookup_falls_back_to_fusion() {
    let config = RetrievalConfig::default();
    let decision = choose_strategy(&profile(IntentCategory::FactualLookup, 0.3), &config);
    assert_eq!(decision.strategy, Strategy::Fusion);
    assert_eq!(decision.dense_weight, config.dense_weight);
}

#[test]
fn aggregation_boosts_dense_weight() {
    let config = RetrievalConfig::default();
    let decision = choose_strategy(&profile(IntentCategory::AggregationStatistic, 0.7), &config);
    assert_eq!(decision.strategy, Strategy::Fusion);
    assert!((decision.dense_weight - 0.8).abs() < f32::EPSILON);
    assert!((decision.sparse_weight - 0.2).abs() < f32::EPSILON);
}

#[test]
fn default_case_uses_configured_weights() {
    let config = RetrievalConfig::default();
    for intent in [IntentCategory::Ambiguous, IntentCategory::Comparison, IntentCategory::LocationBased] {
        let decision = choose_strategy(&profile(intent, 0.5), &config);
        assert_eq!(decision.strategy, Strategy::Fusion);
        assert!((decision.dense_weight - 0.6).abs() < f32::EPSILON);
        assert!((decision.sparse_weight - 0.4).abs() < f32::EPSILON);
    }
}

#[test]
fn top_of_both_paths_fuses_to_exactly_one() {
    // A is the max of both result sets: normalized 1.0 on each path, so
    // 0.6 * 1.0 + 0.4 * 1.0 = 1.0.
    let dense = vec![hit("A", 0.9, RetrievalType::Dense), hit("B", 0.2, RetrievalType::Dense)];
    let sparse = vec![hit("A", 2.0, RetrievalType::Sparse), hit("C", 0.5, RetrievalType::Sparse)];
    let fused = fuse(&dense, &sparse, 0.6, 0.4);
    assert_eq!(fused[0].id, "A");
    assert!((fused[0].score - 1.0).abs() < 1e-6);
    assert!((fused[0].dense_score - 1.0).abs() < 1e-6);
    assert!((fused[0].sparse_score - 1.0).abs() < 1e-6);
}

#[test]
fn chunk_in_both_paths_appears_once_with_both_tags() {
    let dense = vec![hit("A", 0.9, RetrievalType::Dense), hit("B", 0.2, RetrievalType::Dense)];
    let sparse = vec![hit("A", 2.0, RetrievalType::Sparse)];
    let fused = fuse(&dense, &sparse, 0.6, 0.4);
    let a_entries: Vec<_> = fused.iter().filter(|f| f.id == "A").collect();
    assert_eq!(a_entries.len(), 1);
    assert!(a_entries[0].retrieval_types.contains(&RetrievalType::Dense));
    assert!(a_entries[0].retrieval_types.contains(&RetrievalType::Sparse));
}

#[test]
fn absent_path_contributes_zero_not_exclusion() {
    let dense = vec![hit("A", 0.9, RetrievalType::Dense), hit("B", 0.5, RetrievalType::Dense)];
    let sparse = vec![hit("C", 1.5, RetrievalType::Sparse)];
    let fused = fuse(&dense, &sparse, 0.6, 0.4);
    let ids: Vec<&str> = fused.iter().map(|f| f.id.as_str()).collect();
    assert!(ids.contains(&"B"), "dense-only chunk stays eligible");
    assert!(ids.contains(&"C"), "sparse-only chunk stays eligible");
    let b = fused.iter().find(|f| f.id == "B").expect("B fused");
    assert_eq!(b.sparse_score, 0.0);
}

#[test]
fn merge_is_commutative() {
    let dense = vec![
        hit("A", 0.9, RetrievalType::Dense),
        hit("B", 0.4, RetrievalType::Dense),
        hit("C", 0.1, RetrievalType::Dense),
    ];
    let sparse = vec![hit("B", 3.0, RetrievalType::Sparse), hit("D", 1.0, RetrievalType::Sparse)];

    let forward = fuse(&dense, &sparse, 0.6, 0.4);
    // Supplying the paths in the opposite order (with their weights) must
    // yield the same final ranking.
    let swapped = fuse(&sparse, &dense, 0.4, 0.6);

    // swapped run treats sparse hits as the "dense" argument, so compare
    // only the fused (id, score) ranking, which is what the caller sees.
    let forward_pairs: Vec<_> = forward.iter().map(|f| (f.id.clone(), f.score)).collect();
    let swapped_pairs: Vec<_> = swapped.iter().map(|f| (f.id.clone(), f.score)).collect();
    assert_eq!(forward_pairs.len(), swapped_pairs.len());
    for ((id_a, score_a), (id_b, score_b)) in forward_pairs.iter().zip(&swapped_pairs) {
        assert_eq!(id_a, id_b);
        assert!((score_a - score_b).abs() < 1e-6);
    }
}

#[test]
fn fusion_sorts_desc_with_id_tiebreak() {
    let dense = vec![hit("B", 1.0, RetrievalType::Dense), hit("A", 1.0, RetrievalType::Dense)];
    let fused = fuse(&dense, &[], 1.0, 0.0);
    assert_eq!(fused[0].id, "A");
    assert_eq!(fused[1].id, "B");
}

#[test]
fn weights_are_a_sum_not_an_average() {
    // Weights summing over 1 proportionally inflate scores; that is the
    // documented contract.
    let dense = vec![hit("A", 1.0, RetrievalType::Dense)];
    let sparse = vec![hit("A", 1.0, RetrievalType::Sparse)];
    let fused = fuse(&dense, &sparse, 1.0, 1.0);
    assert!((fused[0].score - 2.0).abs() < 1e-6);
}

#[test]
fn single_path_normalizes_scores() {
    let hits = vec![
        hit("A", 8.0, RetrievalType::Sparse),
        hit("B", 4.0, RetrievalType::Sparse),
        hit("C", 0.0, RetrievalType::Sparse),
    ];
    let fused = single_path(&hits, RetrievalType::Sparse);
    assert_eq!(fused[0].score, 1.0);
    assert_eq!(fused[1].score, 0.5);
    assert_eq!(fused[2].score, 0.0);
    assert!(fused.iter().all(|f| f.retrieval_types == vec![RetrievalType::Sparse]));
    assert!(fused.iter().all(|f| f.dense_score == 0.0));
}
