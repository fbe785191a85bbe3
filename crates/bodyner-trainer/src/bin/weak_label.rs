//! Label a raw corpus straight from the lexicon matcher.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use bodyner_core::{Lexicon, Matcher, RuleAnalyzer, WeakLabeler, extract_records};
use bodyner_trainer::{read_json, write_json};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "weak-label")]
#[command(about = "Produce lexicon-labeled training examples without annotation")]
#[command(version)]
struct Cli {
    /// JSON array of posts/comments with `selftext` and/or `body`
    input: PathBuf,

    /// Where to write the `[text, {"entities": [...]}]` examples
    #[arg(default_value = "yoga_trainingData.json")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let records = extract_records(&read_json(&cli.input)?)?;
    let labeler = WeakLabeler::new(
        Arc::new(RuleAnalyzer::new()?),
        Matcher::new(Arc::new(Lexicon::body_parts())),
    );
    let examples = labeler.label(&records);

    write_json(&cli.output, &examples)?;
    info!("Wrote {} examples to {}", examples.len(), cli.output.display());
    Ok(())
}
