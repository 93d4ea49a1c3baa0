//! rerag-hybrid
//!
//! Query classification, adaptive routing and the hybrid retrieval engine
//! that fuses the dense and sparse index paths into one ranked result.

pub mod classify;
pub mod engine;
pub mod router;

pub use classify::{classify, IntentCategory, QueryProfile};
pub use engine::{HybridRetriever, RetrievalEngine};
pub use router::RoutingDecision;
