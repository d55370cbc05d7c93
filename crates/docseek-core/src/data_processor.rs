//! Page loading and fixed-window chunking.
//!
//! Text files are treated as extracted documents: form-feed characters
//! separate pages (the `pdftotext` convention) and each non-blank page becomes
//! one [`PageRecord`] with id `<stem>_p<page>`. Pages are then cut into
//! overlapping whitespace-token windows with ids `<doc_id>_c<n>`.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{ChunkRecord, PageRecord};

const PAGE_BREAK: char = '\x0c';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window width in whitespace tokens.
    pub chunk_size: usize,
    /// Tokens shared by consecutive windows; must be below `chunk_size`.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 500, overlap: 100 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::invalid_config("chunk_size must be positive"));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::invalid_config(format!(
                "overlap must be between 0 and chunk_size - 1 (chunk_size={}, overlap={})",
                self.chunk_size, self.overlap
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new(chunking_config: ChunkingConfig) -> Result<Self> {
        chunking_config.validate()?;
        Ok(Self { chunking_config })
    }

    /// Load every page under `data_dir` and chunk it.
    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<ChunkRecord>> {
        let pages = self.load_pages(data_dir)?;
        let chunks = self.chunk_pages(&pages);
        tracing::info!(pages = pages.len(), chunks = chunks.len(), "processed {}", data_dir.display());
        Ok(chunks)
    }

    /// One record per non-blank page of each `.txt` file directly inside
    /// `data_dir`, in path order. A missing directory yields no pages.
    pub fn load_pages(&self, data_dir: &Path) -> Result<Vec<PageRecord>> {
        if !data_dir.exists() {
            tracing::warn!("data directory {} does not exist", data_dir.display());
            return Ok(vec![]);
        }
        let mut records = Vec::new();
        for file_path in list_txt_files(data_dir) {
            let content = read_file_content(&file_path)?;
            let stem = file_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            for (page_index, page) in content.split(PAGE_BREAK).enumerate() {
                let text = page.trim();
                if text.is_empty() { continue; }
                records.push(PageRecord { doc_id: format!("{}_p{}", stem, page_index + 1), text: text.to_string() });
            }
        }
        Ok(records)
    }

    /// Cut pages into overlapping windows. Pages without tokens produce no chunks.
    pub fn chunk_pages(&self, pages: &[PageRecord]) -> Vec<ChunkRecord> {
        let ChunkingConfig { chunk_size, overlap } = self.chunking_config;
        let step = chunk_size - overlap;
        let mut chunks = Vec::new();
        for page in pages {
            let tokens: Vec<&str> = page.text.split_whitespace().collect();
            let mut start = 0;
            let mut chunk_index = 0;
            while start < tokens.len() {
                let end = (start + chunk_size).min(tokens.len());
                chunks.push(ChunkRecord {
                    doc_id: page.doc_id.clone(),
                    chunk_id: format!("{}_c{}", page.doc_id, chunk_index),
                    text: tokens[start..end].join(" "),
                });
                chunk_index += 1;
                if end >= tokens.len() { break; }
                start += step;
            }
        }
        chunks
    }
}

fn read_file_content(file_path: &Path) -> Result<String> {
    let bytes = fs::read(file_path).map_err(|source| Error::Io { path: file_path.to_path_buf(), source })?;
    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    txt_files.sort();
    txt_files
}
