//! docseek: hybrid BM25 + dense retrieval over a directory of text files.
//!
//! ```bash
//! docseek query "pressure relief valve" --top-k 5
//! docseek query "valve" --alpha 0.3 --json --data-dir ./manuals
//! docseek recall --retrieved doc_c,doc_b,doc_d,doc_a --relevant doc_a,doc_b --k 3
//! ```
//!
//! Indexes are built in memory on every `query` run.

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docseek_core::config::Config;
use docseek_core::data_processor::DataProcessor;
use docseek_core::error::{ensure_alpha, ensure_top_k};
use docseek_core::evaluation::recall_at_k;
use docseek_embed::default_embedder;
use docseek_hybrid::HybridSearchEngine;

#[derive(Parser)]
#[command(name = "docseek", version, about)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index a directory of .txt files and run one hybrid query against it
    Query {
        /// Search query
        query: String,

        /// Directory of .txt files (default: data.docs_dir from config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Number of fused results (default: retrieval.top_k from config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Weight of the dense signal in [0, 1] (default: retrieval.alpha from config)
        #[arg(short, long)]
        alpha: Option<f32>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recall@k of a retrieved id list against a relevant id set
    Recall {
        #[arg(long, value_delimiter = ',', required = true)]
        retrieved: Vec<String>,

        #[arg(long, value_delimiter = ',', required = true)]
        relevant: Vec<String>,

        #[arg(long, default_value = "5")]
        k: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    match cli.command {
        Command::Query { query, data_dir, top_k, alpha, json } => run_query(&query, data_dir, top_k, alpha, json).await,
        Command::Recall { retrieved, relevant, k } => {
            println!("recall@{k} = {:.4}", recall_at_k(&retrieved, &relevant, k));
            Ok(())
        }
    }
}

async fn run_query(query: &str, data_dir: Option<PathBuf>, top_k: Option<usize>, alpha: Option<f32>, json: bool) -> Result<()> {
    let settings = Config::load().context("loading configuration")?.settings()?;
    let top_k = top_k.unwrap_or(settings.retrieval.top_k);
    let alpha = alpha.unwrap_or(settings.retrieval.alpha);
    ensure_top_k(top_k)?;
    ensure_alpha(alpha)?;
    let docs_dir = data_dir.unwrap_or_else(|| settings.data.docs_path());

    let processor = DataProcessor::new(settings.chunking.clone())?;
    let chunks = processor.process_directory(&docs_dir)?;
    tracing::info!(chunks = chunks.len(), dir = %docs_dir.display(), "corpus loaded");
    if chunks.is_empty() && !json {
        println!("{}", output::format_empty_corpus(&docs_dir));
        return Ok(());
    }

    let embedder = default_embedder(&settings.embedding).context("loading embedder")?;
    let engine = HybridSearchEngine::build(&chunks, embedder, &settings.retrieval)?;
    let results = engine.query_concurrent(query, top_k, alpha).await?;

    let rendered = if json { output::format_json(query, &results)? } else { output::format_human(query, &results) };
    println!("{rendered}");
    Ok(())
}
