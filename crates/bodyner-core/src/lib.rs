//! # Bodyner Core
//!
//! Weak-supervision pipeline for recognizing body-part mentions in informal
//! health and fitness text. Provides the lexicon matcher, labeling-task
//! generation, BILOU conversion of human annotations, deterministic corpus
//! splitting and the inference adapter used for pre-annotation.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use bodyner_core::{Lexicon, Matcher, RuleAnalyzer, TextAnalyzer};
//!
//! let analyzer = RuleAnalyzer::new().unwrap();
//! let matcher = Matcher::new(Arc::new(Lexicon::body_parts()));
//!
//! let spans = matcher.find(&analyzer.analyze("Stretch your calves and feet."));
//! assert_eq!(spans.len(), 2);
//! assert_eq!(spans[0].label, "BODY_PART");
//! ```
pub mod annotation;
pub mod config;
pub mod corpus;
pub mod error;
pub mod lexicon;
pub mod matcher;
pub mod predict;
pub mod tagging;
pub mod tasks;
pub mod text;
pub mod types;
pub mod weak;

// Re-export primary API
pub use annotation::{
    ExportTask, ReconcileOptions, ReconcileStats, Reconciler, Reconciliation, load_export,
};
pub use config::LabelConfig;
pub use corpus::{Corpus, GoldDocument, Split, split};
pub use error::{CoreError, Result};
pub use lexicon::Lexicon;
pub use matcher::Matcher;
pub use predict::{
    Backend, FitOutcome, PredictRequest, PredictResponse, Predictor, Recognizer, TaskPrediction,
};
pub use tagging::{AlignOptions, BilouTag, TagKind};
pub use tasks::{TaskBatch, TaskBuilder, extract_records, tasks_to_json};
pub use text::{Pos, RuleAnalyzer, TextAnalyzer, Token, Tokenizer};
pub use types::{BODY_PART, CandidateSpan, EntitySpan, LabelingTask, TextField, TextRecord};
pub use weak::{WeakExample, WeakLabeler};
