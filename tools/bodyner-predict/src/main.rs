//! Pre-annotate tasks: reads prediction requests and prints one response
//! (or error object) per request, in order.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bodyner_core::predict::{Backend, PredictRequest, Predictor, TaskPrediction};
use bodyner_core::{LabelConfig, Lexicon, RuleAnalyzer};
use bodyner_trainer::PerceptronTagger;
use clap::Parser;
use serde_json::{Value, json};
use tracing::info;

#[derive(Parser)]
#[command(name = "bodyner-predict")]
#[command(about = "Run the BODY_PART recognizer over annotation tasks")]
#[command(version)]
struct Cli {
    /// Label config (plain or the tool's parsed label config)
    #[arg(short, long)]
    config: PathBuf,

    /// Trained model to merge with lexicon matches
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// JSON array of tasks (`{"data": {...}}`), or `-` for stdin
    #[arg(default_value = "-")]
    input: String,
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
    }
}

/// Accepts a task array or a single task.
fn parse_requests(json: &str) -> Result<Vec<PredictRequest>> {
    let value: Value = serde_json::from_str(json).context("input is not valid JSON")?;
    let requests = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(requests)
}

fn render(prediction: TaskPrediction) -> Result<Value> {
    Ok(match prediction.result {
        Ok(response) => serde_json::to_value(response)?,
        Err(err) => json!({ "error": err.to_string() }),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();

    let config = LabelConfig::from_file(&cli.config)
        .with_context(|| format!("invalid label config {}", cli.config.display()))?;
    let mut predictor = Predictor::new(
        config,
        Arc::new(Lexicon::body_parts()),
        Arc::new(RuleAnalyzer::new()?),
    )?;
    if let Some(path) = &cli.model {
        let model = PerceptronTagger::load(path)
            .with_context(|| format!("failed to load model {}", path.display()))?;
        info!("Loaded model with {} features", model.feature_count());
        predictor = predictor.with_recognizer(Arc::new(model));
    }

    let requests = parse_requests(&read_input(&cli.input)?)?;
    let output = predictor
        .predict(&requests)
        .into_iter()
        .map(render)
        .collect::<Result<Vec<_>>>()?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
