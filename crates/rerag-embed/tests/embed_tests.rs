use rerag_core::traits::Embedder;
use rerag_embed::{default_embedder, HashingEmbedder, DEFAULT_DIM};

#[test]
fn vectors_are_deterministic() {
    let embedder = HashingEmbedder::default();
    let texts = vec!["Panvel residential project".to_string()];
    let a = embedder.embed_batch(&texts).expect("embed");
    let b = embedder.embed_batch(&texts).expect("embed");
    assert_eq!(a, b);
}

#[test]
fn vectors_have_stable_dimensionality() {
    let embedder = HashingEmbedder::new(64);
    let texts = vec![
        "short".to_string(),
        "a considerably longer piece of text about registration numbers".to_string(),
        String::new(),
    ];
    let vectors = embedder.embed_batch(&texts).expect("embed");
    for v in &vectors {
        assert_eq!(v.len(), 64);
    }
}

#[test]
fn vectors_are_l2_normalized() {
    let embedder = HashingEmbedder::default();
    let texts = vec!["RERA registration P51700012345 in Raigarh".to_string()];
    let v = &embedder.embed_batch(&texts).expect("embed")[0];
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-3, "norm was {norm}");
}

#[test]
fn similar_text_scores_higher_than_unrelated() {
    let embedder = HashingEmbedder::default();
    let texts = vec![
        "residential apartment units sold in Panvel".to_string(),
        "apartment units sold Panvel residential".to_string(),
        "cryptographic hash function benchmark".to_string(),
    ];
    let vs = embedder.embed_batch(&texts).expect("embed");
    let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    assert!(dot(&vs[0], &vs[1]) > dot(&vs[0], &vs[2]));
}

#[test]
fn default_embedder_reports_default_dim() {
    let embedder = default_embedder().expect("embedder");
    assert_eq!(embedder.dim(), DEFAULT_DIM);
}
