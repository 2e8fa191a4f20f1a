//! Processor CLI: answers ranked keyword queries against an index built
//! by `termdex-index`.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use termdex::{Processor, ProcessorConfig, Tokenizer, WhitespaceTokenizer};

#[derive(Parser)]
#[command(about = "Answer ranked keyword queries against a termdex index")]
struct Opts {
    /// Path to `final_inverted_index.jsonl` produced by `termdex-index`
    /// (its sibling `lexicon.jsonl`, `document_index.jsonl`, and
    /// `stats.json` are loaded from the same directory).
    #[arg(short = 'i', long = "index_file_path")]
    index_file_path: PathBuf,

    /// Path to a file with one query per line.
    #[arg(short = 'q', long = "queries_file_path")]
    queries_file_path: PathBuf,

    /// Ranker to use: `bm25` or `tfidf`.
    #[arg(short = 'r', long = "ranker")]
    ranker: String,

    /// Number of results to return per query.
    #[arg(short = 'k', long = "top_k", default_value_t = 10)]
    top_k: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let opts = Opts::parse();

    let ranker = match opts.ranker.parse() {
        Ok(r) => r,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let config = match ProcessorConfig::with_top_k(
        opts.index_file_path,
        opts.queries_file_path,
        ranker,
        opts.top_k,
    ) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let load_start = std::time::Instant::now();
    let processor = match Processor::open(&config.index_file_path) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    debug!(elapsed_ms = load_start.elapsed().as_millis() as u64, "index loaded");

    let queries = match fs::read_to_string(&config.queries_file_path) {
        Ok(q) => q,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let tokenizer = WhitespaceTokenizer::default();
    for line in queries.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let query_start = std::time::Instant::now();
        match processor.query(&tokenizer as &dyn Tokenizer, line, config.ranker, config.top_k) {
            Ok(results) => {
                debug!(query = line, elapsed_ms = query_start.elapsed().as_millis() as u64, "query answered");
                let doc_ids: Vec<String> = results.iter().map(|d| d.doc_id.clone()).collect();
                println!("{line}\t{}", doc_ids.join(","));
            }
            Err(err) => {
                eprintln!("error answering query {line:?}: {err}");
                std::process::exit(1);
            }
        }
    }
}
