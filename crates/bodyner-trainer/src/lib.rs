//! # Bodyner Trainer
//!
//! Statistical side of the pipeline: a structured-perceptron recognizer
//! trained on the reconciled gold corpus, entity-level evaluation, and the
//! file helpers shared by the pipeline binaries.

pub mod data;
pub mod metrics;
pub mod model;
pub mod trainer;

pub use data::{load_corpus, read_json, write_corpus, write_json};
pub use metrics::{Scores, evaluate};
pub use model::{PerceptronTagger, TagSet, viterbi_decode};
pub use trainer::{EpochStats, Trainer, TrainerConfig, TrainingReport};
