//! Train the perceptron recognizer on a training file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use bodyner_core::{Lexicon, RuleAnalyzer};
use bodyner_trainer::{Trainer, TrainerConfig, load_corpus};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Train the BODY_PART recognizer")]
#[command(version)]
struct Cli {
    /// Training file (training format or weak-label format)
    train_file: PathBuf,

    /// Where to save the model
    output_model: PathBuf,

    /// Dev file scored after every epoch
    #[arg(long)]
    dev: Option<PathBuf>,

    #[arg(long, default_value_t = 10)]
    epochs: usize,

    #[arg(long, default_value_t = 27)]
    seed: u64,

    #[arg(long, default_value_t = 0.2)]
    dropout: f64,

    #[arg(long, default_value_t = 1.0)]
    learning_rate: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let analyzer = RuleAnalyzer::new()?;
    let train = load_corpus(&cli.train_file, &analyzer)?;
    let dev = cli
        .dev
        .as_ref()
        .map(|path| load_corpus(path, &analyzer))
        .transpose()?;

    let config = TrainerConfig {
        epochs: cli.epochs,
        dropout: cli.dropout,
        learning_rate: cli.learning_rate,
        seed: cli.seed,
    };
    let trainer = Trainer::new(config, Arc::new(Lexicon::body_parts()));
    let report = trainer.train(&train, dev.as_ref())?;

    report.model.save(&cli.output_model)?;
    match report.best_scores() {
        Some(scores) => info!("Model saved to {} (dev {})", cli.output_model.display(), scores),
        None => info!("Model saved to {}", cli.output_model.display()),
    }
    Ok(())
}
