//! # Bodyner
//!
//! Weak-supervision toolkit for recognizing body-part mentions in informal
//! health and fitness text.
//!
//! - [`core`]: lexicon matching, labeling tasks, annotation reconciliation,
//!   corpus splitting and the inference adapter.
//! - [`trainer`]: the perceptron recognizer, its training loop and evaluation.
//!
//! ```rust
//! use std::sync::Arc;
//! use bodyner::prelude::*;
//!
//! let predictor = Predictor::new(
//!     LabelConfig::default(),
//!     Arc::new(Lexicon::body_parts()),
//!     Arc::new(RuleAnalyzer::new().unwrap()),
//! )
//! .unwrap();
//!
//! let response = predictor.predict_text("my wrist is sore");
//! assert_eq!(response.result[0].value.text, "wrist");
//! ```

pub use bodyner_core as core;
pub use bodyner_trainer as trainer;

pub mod prelude {
    pub use bodyner_core::{
        Backend, BilouTag, Corpus, CoreError, EntitySpan, GoldDocument, LabelConfig, Lexicon,
        Matcher, PredictRequest, PredictResponse, Predictor, Recognizer, Reconciler,
        RuleAnalyzer, TaskBuilder, TextAnalyzer, WeakLabeler, split,
    };
    pub use bodyner_trainer::{PerceptronTagger, Trainer, TrainerConfig, evaluate};
}
