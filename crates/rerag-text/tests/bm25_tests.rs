use rerag_core::traits::SparseIndexer;
use rerag_core::types::{Chunk, ChunkCategory};
use rerag_text::Bm25Index;

fn corpus() -> Vec<Chunk> {
    vec![
        Chunk::new(
            "p1",
            ChunkCategory::Registration,
            0,
            "RERA REGISTRATION DETAILS: Project GOLDEN HEIGHTS registration number P51700012345",
        ),
        Chunk::new(
            "p1",
            ChunkCategory::Location,
            0,
            "LOCATION DETAILS: District Raigarh Taluka Panvel Village Adai PIN 410206",
        ),
        Chunk::new(
            "p2",
            ChunkCategory::Promoter,
            0,
            "PROMOTER DETAILS: Promoter Guru Sai Developer partnership firm",
        ),
        Chunk::new(
            "p2",
            ChunkCategory::Statistic,
            0,
            "PROJECT STATISTICS: total units 120 residential units 110 commercial units 10",
        ),
    ]
}

#[test]
fn build_rejects_empty_corpus() {
    let err = Bm25Index::build(&[]).unwrap_err();
    assert!(matches!(err, rerag_core::error::Error::EmptyCorpus));
}

#[test]
fn self_retrieval_ranks_own_text_first() {
    let chunks = corpus();
    let index = Bm25Index::build(&chunks).expect("build");
    for chunk in &chunks {
        let hits = index.search(&chunk.text, 4).expect("search");
        assert!(!hits.is_empty());
        assert_eq!(hits[0].id, chunk.id, "chunk's own text must retrieve it first");
    }
}

#[test]
fn search_respects_k_and_has_no_duplicates() {
    let index = Bm25Index::build(&corpus()).expect("build");
    let hits = index.search("project details registration", 2).expect("search");
    assert!(hits.len() <= 2);
    let mut ids: Vec<_> = hits.iter().map(|h| h.id.clone()).collect();
    ids.dedup();
    assert_eq!(ids.len(), hits.len());
}

#[test]
fn zero_k_is_an_input_contract_violation() {
    let index = Bm25Index::build(&corpus()).expect("build");
    let err = index.search("panvel", 0).unwrap_err();
    assert!(matches!(err, rerag_core::error::Error::InvalidArgument(_)));
}

#[test]
fn disjoint_query_returns_empty_not_error() {
    let index = Bm25Index::build(&corpus()).expect("build");
    let hits = index.search("zucchini marmalade spaceship", 10).expect("search");
    assert!(hits.is_empty());
}

#[test]
fn stopword_only_query_returns_empty() {
    let index = Bm25Index::build(&corpus()).expect("build");
    let hits = index.search("what is the", 10).expect("search");
    assert!(hits.is_empty());
}

#[test]
fn scores_descend_and_ties_break_by_id() {
    let chunks = vec![
        Chunk::new("p1", ChunkCategory::Summary, 0, "panvel panvel project"),
        Chunk::new("p2", ChunkCategory::Summary, 0, "panvel panvel project"),
        Chunk::new("p3", ChunkCategory::Summary, 0, "unrelated text entirely"),
    ];
    let index = Bm25Index::build(&chunks).expect("build");
    let hits = index.search("panvel", 10).expect("search");
    assert_eq!(hits.len(), 2);
    // identical documents tie on score and order by ascending chunk id
    assert_eq!(hits[0].id, "p1:summary:0");
    assert_eq!(hits[1].id, "p2:summary:0");
    assert!((hits[0].score - hits[1].score).abs() < 1e-6);
}

#[test]
fn rebuild_over_same_corpus_is_deterministic() {
    let chunks = corpus();
    let first = Bm25Index::build(&chunks).expect("build");
    let second = Bm25Index::build(&chunks).expect("build");
    for query in ["registration number", "district panvel", "total residential units"] {
        let a = first.search(query, 10).expect("search");
        let b = second.search(query, 10).expect("search");
        let pairs_a: Vec<_> = a.iter().map(|h| (h.id.clone(), h.score)).collect();
        let pairs_b: Vec<_> = b.iter().map(|h| (h.id.clone(), h.score)).collect();
        assert_eq!(pairs_a, pairs_b);
    }
}
