use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load configuration: {0}")]
    Config(String),

    #[error("Search task failed: {0}")]
    Task(String),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Wrap an embedder failure, keeping the full `anyhow` context chain.
    pub fn embedding(err: &anyhow::Error) -> Self {
        Self::Embedding(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject a non-positive result count at the call boundary.
pub fn ensure_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(Error::invalid_config("top_k must be a positive integer"));
    }
    Ok(())
}

/// Reject a fusion weight outside `[0, 1]` (NaN included).
pub fn ensure_alpha(alpha: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(Error::invalid_config(format!("alpha must be within [0, 1], got {alpha}")));
    }
    Ok(())
}
