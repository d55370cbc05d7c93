//! docseek-vector
//!
//! Exact nearest-neighbour index over chunk embeddings. Vectors live in one
//! contiguous row-major buffer and every query scans all of them, so results
//! are the true L2 neighbours; no approximate structure is involved.
pub mod embed_batches;
pub mod search;

pub use search::{similarity_from_distance, squared_l2, DenseIndex, DEFAULT_BATCH_SIZE};
