//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys separated by `__`, e.g.
//! `APP_RETRIEVAL__ALPHA=0.3`). Typed sections are validated on load so a bad
//! `alpha` or chunk sizing fails before any index is built.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::data_processor::ChunkingConfig;
use crate::error::{ensure_alpha, ensure_top_k, Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => tracing::warn!(env = %env_name, "unknown RUST_ENV, using config.toml only"),
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    /// Wrap an already-assembled figment (tests, embedding applications).
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment: Figment::from(Serialized::defaults(Settings::default())).merge(figment) }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::Config(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment.extract().map_err(|e| Error::Config(e.to_string()))
    }
}

/// All typed configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub data: DataConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate()?;
        self.chunking.validate()?;
        self.embedding.validate()
    }
}

/// Query-time and build-time knobs of the hybrid engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Weight of the dense signal in the blend.
    pub alpha: f32,
    pub embed_batch_size: usize,
    pub k1: f32,
    pub b: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5, alpha: 0.6, embed_batch_size: 32, k1: 1.5, b: 0.75 }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_top_k(self.top_k)?;
        ensure_alpha(self.alpha)?;
        if self.embed_batch_size == 0 {
            return Err(Error::invalid_config("embed_batch_size must be positive"));
        }
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::invalid_config(format!("k1 must be a finite non-negative number, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::invalid_config(format!("b must be within [0, 1], got {}", self.b)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Directory holding `config.json`, `tokenizer.json` and the weights.
    pub model_dir: String,
    pub max_len: usize,
    /// Use the hashing embedder instead of loading a model.
    pub use_fake: bool,
    pub fake_dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { model_dir: "models/all-MiniLM-L6-v2".to_string(), max_len: 256, use_fake: false, fake_dim: 384 }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_len == 0 {
            return Err(Error::invalid_config("embedding.max_len must be positive"));
        }
        if self.fake_dim == 0 {
            return Err(Error::invalid_config("embedding.fake_dim must be positive"));
        }
        Ok(())
    }

    pub fn model_path(&self) -> PathBuf {
        expand_path(&self.model_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub docs_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { docs_dir: "data/sample_docs".to_string() }
    }
}

impl DataConfig {
    pub fn docs_path(&self) -> PathBuf {
        expand_path(&self.docs_dir)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
