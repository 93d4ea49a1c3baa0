//! rerag-vector
//!
//! In-memory dense index over chunk embeddings. Vectors are L2-normalized
//! at build time so nearest-neighbor search is a plain inner-product scan.

pub mod index;

pub use index::DenseIndex;
