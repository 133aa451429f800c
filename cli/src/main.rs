use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use screener_core::{load_corpus, rank, Document, IdfFormula, RankConfig};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Rank resumes against a job description by TF-IDF similarity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a corpus of resumes against a job description
    Rank {
        /// Corpus path: a JSON/JSONL file or a directory of resume files
        #[arg(long)]
        corpus: PathBuf,
        /// Job description text
        #[arg(long, conflicts_with = "query_file")]
        query: Option<String>,
        /// Read the job description from a file instead
        #[arg(long)]
        query_file: Option<PathBuf>,
        /// Number of rows to print
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Only rank resumes whose category is in this comma-separated list
        #[arg(long)]
        category: Option<String>,
        /// Use IDF = ln(n/df) + 1 instead of the smoothed default
        #[arg(long, default_value_t = false)]
        standard_idf: bool,
        /// Score on unigrams only (default is unigrams + bigrams)
        #[arg(long, default_value_t = false)]
        unigrams: bool,
        /// Emit results as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank { corpus, query, query_file, top, category, standard_idf, unigrams, json } => {
            let query = match (query, query_file) {
                (Some(q), _) => q,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading query from {}", path.display()))?,
                (None, None) => bail!("supply a job description via --query or --query-file"),
            };
            run_rank(&corpus, &query, top, category.as_deref(), standard_idf, unigrams, json)
        }
    }
}

fn run_rank(
    corpus_path: &PathBuf,
    query: &str,
    top: usize,
    category: Option<&str>,
    standard_idf: bool,
    unigrams: bool,
    json: bool,
) -> Result<()> {
    let start = std::time::Instant::now();
    let mut corpus = load_corpus(corpus_path)?;
    if let Some(list) = category {
        corpus = filter_by_category(corpus, list);
        tracing::info!(docs = corpus.len(), "filtered corpus by category");
    }

    let config = RankConfig {
        ngram_range: if unigrams { (1, 1) } else { (1, 2) },
        idf: if standard_idf { IdfFormula::Standard } else { IdfFormula::Smooth },
        ..Default::default()
    };
    let ranked = rank(&corpus, query, &config)?;
    tracing::info!(docs = ranked.len(), took_s = start.elapsed().as_secs_f64(), "ranked corpus");

    let shown = ranked.iter().take(top.max(1));
    if json {
        let rows: Vec<serde_json::Value> = shown
            .map(|s| {
                serde_json::json!({
                    "id": s.doc.id,
                    "category": s.doc.category,
                    "score": s.score,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{:>4}  {:>8}  {:<24}  {}", "rank", "score", "id", "category");
        for (i, s) in shown.enumerate() {
            println!(
                "{:>4}  {:>8.4}  {:<24}  {}",
                i + 1,
                s.score,
                s.doc.id,
                s.doc.category.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(())
}

/// Keep documents whose category matches the comma-separated allow-list,
/// case-insensitively. Filtering happens before ranking; it is not a scoring
/// concern.
fn filter_by_category(corpus: Vec<Document>, list: &str) -> Vec<Document> {
    let allowed: Vec<String> = list
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    corpus
        .into_iter()
        .filter(|d| {
            d.category
                .as_deref()
                .map(|c| allowed.iter().any(|a| a == &c.to_uppercase()))
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_filter_is_case_insensitive() {
        let corpus = vec![
            Document { id: "a".into(), category: Some("Engineering".into()), text: "x".into() },
            Document { id: "b".into(), category: Some("DESIGN".into()), text: "y".into() },
            Document { id: "c".into(), category: None, text: "z".into() },
        ];
        let kept = filter_by_category(corpus, "engineering, software");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "a");
    }
}
