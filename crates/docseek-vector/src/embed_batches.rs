use indicatif::{ProgressBar, ProgressStyle};

use docseek_core::error::{Error, Result};
use docseek_core::traits::Embedder;

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Embed `texts` in consecutive batches of `batch_size` and concatenate the
/// rows in input order. Every batch must come back with one row per text and
/// every row must share the width of the first one.
pub fn embed_in_batches(embedder: &dyn Embedder, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>> {
    if batch_size == 0 {
        return Err(Error::invalid_config("embedding batch size must be positive"));
    }
    let pb = progress_bar(texts.len());
    pb.set_message("embedding");
    let mut rows: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size) {
        let embedded = embedder.embed_batch(batch).map_err(|e| Error::embedding(&e))?;
        if embedded.len() != batch.len() {
            return Err(Error::Embedding(format!("embedder returned {} rows for {} texts", embedded.len(), batch.len())));
        }
        let dim = rows.first().or(embedded.first()).map_or(0, Vec::len);
        if let Some(bad) = embedded.iter().find(|v| v.len() != dim) {
            return Err(Error::Embedding(format!("dim mismatch: got {} expected {}", bad.len(), dim)));
        }
        rows.extend(embedded);
        pb.inc(batch.len() as u64);
    }
    pb.finish_and_clear();
    Ok(rows)
}
