use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use molsim_chem::SimilarityMetric;
use molsim_core::{Annotated, Scored};
use molsim_search::{DescriptorLookup, Ranker, SearchConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Rank molecules in a CSV dataset by structural similarity to a query
#[derive(Parser, Debug)]
#[command(name = "molsim", version)]
#[command(about = "Fingerprint similarity search over molecule datasets", long_about = None)]
struct Args {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank every row of a dataset against a query SMILES; prints a JSON array
    Rank {
        /// Query structure in SMILES notation
        #[arg(short, long)]
        query: String,

        /// CSV dataset with a header row
        #[arg(short, long)]
        dataset: PathBuf,

        /// Tanimoto, Dice or Cosine
        #[arg(short, long)]
        metric: Option<String>,

        /// Morgan radius
        #[arg(long)]
        radius: Option<usize>,

        /// Fingerprint length in bits
        #[arg(long)]
        nbits: Option<usize>,

        /// JSON search configuration
        #[arg(short, long, env = "MOLSIM_CONFIG")]
        config: Option<PathBuf>,

        /// Print only the best N results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the SMILES of a compound by its identifier
    Lookup {
        /// CSV dataset with a header row
        #[arg(short, long)]
        dataset: PathBuf,

        /// Compound identifier (retried with a `cmpd_` prefix)
        #[arg(short, long)]
        id: String,

        /// JSON search configuration
        #[arg(short, long, env = "MOLSIM_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Rank {
            query,
            dataset,
            metric,
            radius,
            nbits,
            config,
            limit,
        } => {
            let mut config = load_config(config)?;
            if let Some(radius) = radius {
                config.radius = radius;
            }
            if let Some(nbits) = nbits {
                config.nbits = nbits;
            }
            let metric: SimilarityMetric = match metric {
                Some(name) => name.parse()?,
                None => config.metric,
            };

            let ranker = Ranker::new(config)?;
            let mut hits = ranker
                .rank(&query, &dataset, metric)
                .with_context(|| format!("ranking {}", dataset.display()))?;
            info!(
                %metric,
                ranked = hits.len(),
                skipped = hits.skipped().len(),
                best = hits.best().map(|h| h.name()).unwrap_or("-"),
                best_score = hits.best().map(|h| h.score()).unwrap_or(0.0),
                "search finished"
            );
            if let Some(limit) = limit {
                hits.truncate(limit);
            }

            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &hits)?;
            writeln!(stdout)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Lookup {
            dataset,
            id,
            config,
        } => {
            let config = load_config(config)?;
            let lookup = DescriptorLookup::from_config(&config);
            match lookup
                .lookup(&dataset, &id)
                .with_context(|| format!("looking up {id} in {}", dataset.display()))?
            {
                Some(smiles) => {
                    println!("{smiles}");
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("no compound with id '{id}' in {}", dataset.display());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<SearchConfig> {
    match path {
        Some(path) => SearchConfig::from_json_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SearchConfig::default()),
    }
}
