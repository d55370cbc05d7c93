//! Human-readable and JSON rendering of fused results.

use std::path::Path;

use serde::Serialize;

use docseek_core::types::FusedHit;

const SNIPPET_MAX_LEN: usize = 200;

#[derive(Serialize)]
struct JsonOutput<'a> {
    query: &'a str,
    results: &'a [FusedHit],
}

pub fn format_json(query: &str, results: &[FusedHit]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&JsonOutput { query, results })?)
}

pub fn format_human(query: &str, results: &[FusedHit]) -> String {
    if results.is_empty() {
        return format!("No results found for \"{query}\"");
    }
    let mut out = format!("{} result{} for \"{query}\":\n\n", results.len(), if results.len() == 1 { "" } else { "s" });
    for hit in results {
        out.push_str(&format!("{}. {} (score: {:.3})\n", hit.rank + 1, hit.chunk_id, hit.score));
        out.push_str(&format!("   [dense: {:.3}, sparse: {:.3}]\n", hit.dense_score, hit.sparse_score));
        out.push_str(&format!("   {}\n\n", snippet(&hit.text, SNIPPET_MAX_LEN)));
    }
    out.trim_end().to_string()
}

pub fn format_empty_corpus(docs_dir: &Path) -> String {
    format!("No documents found in {}. Add .txt files and retry.", docs_dir.display())
}

/// First `max_len` bytes of `text` on a char boundary, cut back to a word
/// boundary when one exists.
fn snippet(text: &str, max_len: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) { end -= 1; }
    let cut = &text[..end];
    match cut.rfind(' ') {
        Some(space) => format!("{}...", &cut[..space]),
        None => format!("{cut}..."),
    }
}
