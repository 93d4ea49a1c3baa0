use thiserror::Error;

use crate::types::ChunkId;

/// Engine error taxonomy. Build-time variants must leave any previously
/// published index untouched; query-time variants are surfaced to the
/// caller, never converted into an empty result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Corpus is empty: nothing to index")]
    EmptyCorpus,

    #[error("Chunk '{0}' has blank text")]
    EmptyText(ChunkId),

    #[error("Duplicate chunk id '{0}' in build pass")]
    DuplicateId(ChunkId),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("{0} index is not ready: build the corpus first")]
    IndexNotReady(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
