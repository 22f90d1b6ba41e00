//! `ns-classify`: prints classification tables of enhanced Néron-Severi lattices.
//!
//! Classifies the real weak del Pezzo lattices of ranks 3 up to `--max-rank`
//! (or of the single rank given by `--rank`) and prints one row per class.
//!
//! **Usage:**
//! ```
//! ns-classify [--max-rank <n>] [--rank <n>] [--provable] [--cache <path>]
//!             [--config <path>] [--log-level <filter>] [--json] [--details]
//! ```
//!
//! When a cache path is set, previously computed results are loaded from it
//! and the updated cache is written back on exit.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ns_lattice::{Classifier, ClassificationReport, ClassifierConfig, DPLattice};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Classify Néron-Severi lattices of real weak del Pezzo surfaces.
#[derive(Parser)]
#[command(
    name = "ns-classify",
    about = "Classify Neron-Severi lattices of real weak del Pezzo surfaces"
)]
struct Args {
    /// Highest rank to classify (3..=9).
    #[arg(long)]
    max_rank: Option<usize>,

    /// Classify only this rank.
    #[arg(long, conflicts_with = "max_rank")]
    rank: Option<usize>,

    /// Use the brute-force algorithm.
    #[arg(long)]
    provable: bool,

    /// JSON file backing the memoization cache.
    #[arg(long)]
    cache: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter (default: RUST_LOG or "info").
    #[arg(long)]
    log_level: Option<String>,

    /// Print the rows as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Print the full description of every lattice after the table.
    #[arg(long)]
    details: bool,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let mut config = match &args.config {
        Some(path) => ClassifierConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ClassifierConfig::default(),
    };
    if let Some(max_rank) = args.max_rank {
        config.max_rank = max_rank;
    }
    if args.provable {
        config.provable = true;
    }
    if args.cache.is_some() {
        config.cache_path = args.cache.clone();
    }
    let config = config.validated();

    let mut classifier = Classifier::open(config.clone()).with_context(|| {
        format!(
            "Failed to open cache {}",
            config
                .cache_path
                .as_deref()
                .map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
        )
    })?;

    let by_rank: BTreeMap<usize, Vec<DPLattice>> = match args.rank {
        Some(rank) => {
            let classes = classifier
                .classify_rank(rank, config.provable)
                .with_context(|| format!("Classification of rank {rank} failed"))?;
            BTreeMap::from([(rank, classes)])
        }
        None => classifier
            .get_cls_real_dp(config.max_rank, config.provable)
            .context("Classification failed")?,
    };

    let mut report = ClassificationReport::new();
    let mut lattices = Vec::new();
    for (rank, classes) in &by_rank {
        info!(rank, classes = classes.len(), "collected");
        for lattice in classes {
            report.push(lattice);
            lattices.push(lattice);
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report.rows).context("Failed to encode rows")?;
        println!("{json}");
    } else {
        println!("Real weak del Pezzo lattices");
        println!("============================");
        println!();
        print!("{}", report.render());
        println!();
        println!("{} classes", report.len());
    }

    if args.details {
        for lattice in lattices {
            print!("{lattice}");
        }
    }

    classifier.save_cache().context("Failed to save cache")?;
    Ok(())
}
