//! Reconcile an annotation export and split it into training and dev files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bodyner_core::config::DEFAULT_INPUT_KEY;
use bodyner_core::{Reconciler, RuleAnalyzer, split};
use bodyner_trainer::write_corpus;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "convert")]
#[command(about = "Convert an annotation export into train/dev training files")]
#[command(version)]
struct Cli {
    /// Export archive (zip with result.json) or bare export JSON
    archive: PathBuf,

    /// Percentage of documents that go to the training file (0-100)
    split: u32,

    /// Training file to write
    train_file: PathBuf,

    /// Dev file to write
    dev_file: PathBuf,

    /// Shuffle seed
    #[arg(long, default_value_t = 27)]
    seed: u64,

    /// Task field holding the source text
    #[arg(short, long, env = "BODYNER_INPUT_KEY", default_value = DEFAULT_INPUT_KEY)]
    key: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let reconciler = Reconciler::new(Arc::new(RuleAnalyzer::new()?), cli.key);
    let out = reconciler
        .reconcile_path(&cli.archive)
        .with_context(|| format!("failed to read export {}", cli.archive.display()))?;
    info!("{}", out.stats);

    let parts = split(out.corpus, cli.split, cli.seed)?;
    write_corpus(&cli.train_file, &parts.train)?;
    write_corpus(&cli.dev_file, &parts.dev)?;

    info!(
        "Wrote {} training docs to {} and {} dev docs to {}",
        parts.train.len(),
        cli.train_file.display(),
        parts.dev.len(),
        cli.dev_file.display()
    );
    Ok(())
}
