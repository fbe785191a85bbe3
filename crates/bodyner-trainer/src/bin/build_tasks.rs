//! Select corpus records that mention a body part and write them as
//! labeling tasks.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use bodyner_core::config::DEFAULT_INPUT_KEY;
use bodyner_core::{Lexicon, Matcher, RuleAnalyzer, TaskBuilder, extract_records, tasks_to_json};
use bodyner_trainer::{read_json, write_json};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "build-tasks")]
#[command(about = "Build labeling tasks from a raw post/comment corpus")]
#[command(version)]
struct Cli {
    /// JSON array of posts/comments with `selftext` and/or `body`
    input: PathBuf,

    /// Where to write the task array
    output: PathBuf,

    /// Task field the annotation tool reads the text from
    #[arg(short, long, env = "BODYNER_INPUT_KEY", default_value = DEFAULT_INPUT_KEY)]
    key: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let corpus = read_json(&cli.input)?;
    let records = extract_records(&corpus)?;

    let builder = TaskBuilder::new(
        Arc::new(RuleAnalyzer::new()?),
        Matcher::new(Arc::new(Lexicon::body_parts())),
    );
    let batch = builder.build(&records);

    write_json(&cli.output, &tasks_to_json(&batch.tasks, &cli.key))?;
    info!("Wrote {} tasks to {}", batch.tasks.len(), cli.output.display());
    Ok(())
}
