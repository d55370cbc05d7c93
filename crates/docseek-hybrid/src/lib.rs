pub mod engine;
pub mod fusion;

pub use engine::HybridSearchEngine;
pub use fusion::{fuse, min_max_normalize, DEFAULT_ALPHA};
