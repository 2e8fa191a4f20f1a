//! Indexer CLI: builds an inverted index from a `.jsonl` corpus under a
//! bounded memory budget.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use termdex::{run_indexing, IndexerConfig, WhitespaceTokenizer};

#[derive(Parser)]
#[command(about = "Build an inverted index over a JSONL corpus under a memory budget")]
struct Opts {
    /// Memory budget for the whole run, in megabytes.
    #[arg(short = 'm', long = "memory_limit_mb")]
    memory_limit_mb: u64,

    /// Path to the `.jsonl` corpus (one `{id, text}` record per line).
    #[arg(short = 'c', long = "corpus_path")]
    corpus_path: PathBuf,

    /// Output directory for the final index, lexicon, document index, and stats.
    #[arg(short = 'i', long = "index_dir")]
    index_dir: PathBuf,

    /// Number of parallel workers. Defaults to the available parallelism.
    #[arg(short = 'w', long = "workers")]
    workers: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let opts = Opts::parse();

    let config = match opts.workers {
        Some(workers) => IndexerConfig::with_workers(
            opts.memory_limit_mb,
            opts.corpus_path,
            opts.index_dir,
            workers,
        ),
        None => IndexerConfig::new(opts.memory_limit_mb, opts.corpus_path, opts.index_dir),
    };

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let tokenizer = WhitespaceTokenizer::default();
    match run_indexing(&config, &tokenizer) {
        Ok(report) => {
            println!(
                "indexed {} documents, {} terms, {} malformed records skipped",
                report.stats.num_documents, report.num_terms, report.malformed_records
            );
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
