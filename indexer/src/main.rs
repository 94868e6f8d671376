mod source;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use sieve_core::persist::{load_index, write_index, IndexPaths};
use sieve_core::query::write_results;
use sieve_core::tokenizer::{default_stopwords, load_stopwords};
use sieve_core::{Analyzer, Codec, IndexBuilder, IndexError, Normalizer, QueryEngine};
use source::{collect_files, load_tags, read_documents};
use tracing_subscriber::{fmt, EnvFilter};

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build Boolean inverted indexes and run batch AND queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a collection file or directory
    Build {
        /// Input path (TREC collection, JSON/JSONL file, or a directory of them)
        #[arg(long)]
        input: PathBuf,
        /// Output prefix; writes <prefix>.idx and <prefix>.dict
        #[arg(long)]
        output: PathBuf,
        /// Stopword file, one word per line (built-in English list if omitted)
        #[arg(long)]
        stopwords: Option<PathBuf>,
        /// Postings codec: 0 raw, 1 vbyte, 2 elias-delta, 3 block
        #[arg(long, default_value = "0")]
        codec: Codec,
        /// Tag file naming the TREC fields to index (first line is a header)
        #[arg(long)]
        tags: Option<PathBuf>,
    },
    /// Evaluate each line of a query file and write `Q<n> <docno> 1.0` results
    Query {
        #[arg(long)]
        queries: PathBuf,
        #[arg(long)]
        results: PathBuf,
        /// Postings file (.idx appended if missing)
        #[arg(long)]
        index: PathBuf,
        /// Metadata file (.dict appended if missing)
        #[arg(long)]
        dict: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stopwords, codec, tags } => {
            build_index(&input, &output, stopwords.as_deref(), codec, tags.as_deref())
        }
        Commands::Query { queries, results, index, dict } => run_queries(&queries, &results, &index, &dict),
    }
}

fn build_index(input: &Path, output: &Path, stopwords: Option<&Path>, codec: Codec, tags: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    let stopwords = match stopwords {
        Some(path) => load_stopwords(path)?,
        None => default_stopwords(),
    };
    let tags = match tags {
        Some(path) => load_tags(path)?,
        None => vec!["TEXT".to_string()],
    };
    let files = collect_files(input);
    if files.is_empty() {
        return Err(IndexError::Config(format!("no input documents under {}", input.display())).into());
    }

    let analyzer = Analyzer::new(stopwords.iter().cloned());
    let mut builder = IndexBuilder::new();
    for file in &files {
        let docs = read_documents(file, &tags)?;
        // normalize in parallel, assign ids in document order
        let normalized: Vec<_> = docs
            .into_par_iter()
            .map(|doc| {
                let terms = doc.text.and_then(|text| analyzer.normalize(&text));
                (doc.key, terms)
            })
            .collect();
        for (key, terms) in normalized {
            builder.ingest(&key, terms)?;
        }
    }

    let stats = builder.stats();
    tracing::info!(
        accepted = stats.accepted,
        skipped_empty = stats.skipped_empty,
        failed = stats.failed,
        files = files.len(),
        "ingested documents"
    );
    if stats.accepted == 0 {
        bail!("no documents produced any terms; nothing to index");
    }

    let index = builder.finalize(codec, stopwords);
    let paths = IndexPaths::from_prefix(output);
    write_index(&paths, &index)?;

    tracing::info!(
        output = %output.display(),
        num_terms = index.num_terms(),
        elapsed_s = start.elapsed().as_secs_f64(),
        "index build complete"
    );
    Ok(())
}

fn run_queries(queries: &Path, results: &Path, index: &Path, dict: &Path) -> Result<()> {
    let start = Instant::now();
    let index = load_index(&IndexPaths::new(index, dict))?;
    let analyzer = Analyzer::new(index.stopwords().iter().cloned());
    let engine = QueryEngine::new(&index, &analyzer);

    let text = fs::read_to_string(queries)?;
    let batch = engine.evaluate_batch(text.lines())?;
    write_results(&batch, BufWriter::new(File::create(results)?))?;

    let hits: usize = batch.iter().map(|r| r.hits.len()).sum();
    tracing::info!(queries = batch.len(), hits, elapsed_s = start.elapsed().as_secs_f64(), "queries answered");
    Ok(())
}
