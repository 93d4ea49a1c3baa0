//! rerag-text
//!
//! In-memory BM25 lexical indexing and search over chunk text. The
//! tokenization pipeline in `tokenize` is a fixed contract: index build and
//! query time must run the exact same pipeline or recall degrades silently.

pub mod index;
pub mod tokenize;

pub use index::Bm25Index;
