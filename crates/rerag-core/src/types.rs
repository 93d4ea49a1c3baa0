//! Domain types shared by the sparse, dense and hybrid engines.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{Error, Result};

pub type ChunkId = String;
pub type ProjectId = String;
pub type Meta = HashMap<String, String>;

/// Fixed set of chunk categories produced by record ingestion.
///
/// The set is closed on purpose: routing and display badges match on it,
/// and the id scheme bakes the category name into the chunk id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChunkCategory {
    Registration,
    Status,
    Timeline,
    Location,
    Geolocation,
    LandArea,
    Plot,
    Promoter,
    Legal,
    Building,
    Apartment,
    Summary,
    QuickFact,
    Statistic,
}

impl ChunkCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkCategory::Registration => "registration",
            ChunkCategory::Status => "status",
            ChunkCategory::Timeline => "timeline",
            ChunkCategory::Location => "location",
            ChunkCategory::Geolocation => "geolocation",
            ChunkCategory::LandArea => "land_area",
            ChunkCategory::Plot => "plot",
            ChunkCategory::Promoter => "promoter",
            ChunkCategory::Legal => "legal",
            ChunkCategory::Building => "building",
            ChunkCategory::Apartment => "apartment",
            ChunkCategory::Summary => "summary",
            ChunkCategory::QuickFact => "quick_fact",
            ChunkCategory::Statistic => "statistic",
        }
    }
}

impl fmt::Display for ChunkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable retrievable unit derived from one project record.
///
/// - `id`: `{project_id}:{category}:{sub_index}`, stable across rebuilds
/// - `project_id`: back-reference to the owning record, not ownership
/// - `category`: closed facet used for badges and filtering
/// - `text`: the payload that gets embedded and tokenized
/// - `metadata`: display-only auxiliary fields, never scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub project_id: ProjectId,
    pub category: ChunkCategory,
    pub text: String,
    pub metadata: Meta,
}

impl Chunk {
    pub fn new(
        project_id: impl Into<ProjectId>,
        category: ChunkCategory,
        sub_index: usize,
        text: impl Into<String>,
    ) -> Self {
        let project_id = project_id.into();
        let id = format!("{}:{}:{}", project_id, category.as_str(), sub_index);
        Self { id, project_id, category, text: text.into(), metadata: Meta::new() }
    }

    pub fn with_metadata(mut self, metadata: Meta) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Validate a chunk set before it is handed to an index build.
///
/// Blank text and colliding ids are build-time data errors; indexes must
/// never see either.
pub fn validate(chunks: &[Chunk]) -> Result<()> {
    if chunks.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    let mut seen: HashSet<&str> = HashSet::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.text.trim().is_empty() {
            return Err(Error::EmptyText(chunk.id.clone()));
        }
        if !seen.insert(chunk.id.as_str()) {
            return Err(Error::DuplicateId(chunk.id.clone()));
        }
    }
    Ok(())
}

/// Which retrieval path produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalType {
    Dense,
    Sparse,
}

impl fmt::Display for RetrievalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalType::Dense => f.write_str("dense"),
            RetrievalType::Sparse => f.write_str("sparse"),
        }
    }
}

/// The minimal surface returned by both index paths.
///
/// `id` matches `Chunk::id`. `score` is path-specific (cosine similarity or
/// raw BM25) and only comparable within one path's result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ChunkId,
    pub score: f32,
    pub source: RetrievalType,
}

/// Retrieval strategy the router settled on for one query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    SparseOnly,
    DenseOnly,
    Fusion,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::SparseOnly => f.write_str("sparse_only"),
            Strategy::DenseOnly => f.write_str("dense_only"),
            Strategy::Fusion => f.write_str("fusion"),
        }
    }
}

/// One ranked chunk in the final result.
///
/// `score` is normalized to [0, 1] within this response; `dense_score` and
/// `sparse_score` are the per-path normalized contributions (0.0 when the
/// path did not return the chunk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
    pub dense_score: f32,
    pub sparse_score: f32,
    pub retrieval_types: Vec<RetrievalType>,
}

/// The engine's sole externally visible output: the ranked chunks plus the
/// routing metadata the caller needs for its transparency display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub results: Vec<ScoredChunk>,
    pub strategy: Strategy,
    pub dense_weight: f32,
    pub sparse_weight: f32,
    pub dense_count: usize,
    pub sparse_count: usize,
    pub reasoning: String,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Distinct categories among the ranked chunks, for the caller's badge row.
    pub fn categories(&self) -> Vec<ChunkCategory> {
        let mut seen = Vec::new();
        for scored in &self.results {
            if !seen.contains(&scored.chunk.category) {
                seen.push(scored.chunk.category);
            }
        }
        seen
    }
}
