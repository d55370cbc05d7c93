//! docseek-core
//!
//! Shared data model, traits, errors and configuration for the docseek
//! retrieval crates, plus the ingestion helpers (page loading and windowed
//! chunking) and the recall@k metric.

pub mod config;
pub mod data_processor;
pub mod error;
pub mod evaluation;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{Embedder, Retriever};
pub use types::{ChunkRecord, FusedHit, PageRecord, SearchHit, SourceKind};
