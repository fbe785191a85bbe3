//! # Inference Adapter
//!
//! Answers the annotation tool's prediction requests. Each request's text is
//! analyzed once; lexicon matches are merged with the spans of an optional
//! statistical [`Recognizer`], with the lexicon winning any overlap, and the
//! result is rendered in the tool's `labels` result format.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::LabelConfig;
use crate::corpus::Corpus;
use crate::error::{CoreError, Result};
use crate::lexicon::Lexicon;
use crate::matcher::Matcher;
use crate::text::{TextAnalyzer, Token, char_slice};
use crate::types::EntitySpan;

/// A sequence labeler over analyzed tokens.
pub trait Recognizer: Send + Sync {
    /// Non-overlapping entity spans in character offsets.
    fn recognize(&self, tokens: &[Token]) -> Vec<EntitySpan>;
}

/// The annotation tool's model backend contract.
pub trait Backend {
    /// One prediction per request, in request order.
    fn predict(&self, requests: &[PredictRequest]) -> Vec<TaskPrediction>;

    /// Update the backend from a gold corpus.
    fn fit(&self, corpus: &Corpus) -> Result<FitOutcome>;
}

/// What a `fit` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FitOutcome {
    pub trained: bool,
    pub documents: usize,
}

/// A task sent for pre-annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl PredictRequest {
    /// A request carrying `text` under `key`.
    pub fn with_text(key: &str, text: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert(key.to_string(), Value::String(text.into()));
        Self { id: None, data }
    }
}

/// The result list for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub result: Vec<ResultEntry>,
}

/// One labeled region, in the tool's result format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub from_name: String,
    pub to_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: LabelValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelValue {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub labels: Vec<String>,
}

/// Outcome for one request. Failures are per request.
#[derive(Debug)]
pub struct TaskPrediction {
    pub id: Option<Value>,
    pub result: Result<PredictResponse>,
}

/// Lexicon matcher plus optional statistical recognizer.
pub struct Predictor {
    config: LabelConfig,
    analyzer: Arc<dyn TextAnalyzer>,
    matcher: Matcher,
    recognizer: Option<Arc<dyn Recognizer>>,
}

impl Predictor {
    /// # Errors
    ///
    /// `InvalidConfig` if the label config is incomplete.
    pub fn new(
        config: LabelConfig,
        lexicon: Arc<Lexicon>,
        analyzer: Arc<dyn TextAnalyzer>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            analyzer,
            matcher: Matcher::new(lexicon),
            recognizer: None,
        })
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Merged, label-filtered spans for `text`, sorted by start.
    pub fn spans(&self, text: &str) -> Vec<EntitySpan> {
        let tokens = self.analyzer.analyze(text);
        let mut spans = self.matcher.find(&tokens);

        if let Some(recognizer) = &self.recognizer {
            for span in recognizer.recognize(&tokens) {
                if spans.iter().any(|kept| kept.overlaps(&span)) {
                    debug!(span = %span, "recognizer span overridden by lexicon match");
                    continue;
                }
                spans.push(span);
            }
        }

        spans.retain(|s| self.config.allows(&s.label));
        spans.sort();
        spans
    }

    /// Prediction for one text.
    pub fn predict_text(&self, text: &str) -> PredictResponse {
        let result = self
            .spans(text)
            .into_iter()
            .map(|span| ResultEntry {
                from_name: self.config.from_name.clone(),
                to_name: self.config.to_name.clone(),
                kind: "labels".to_string(),
                value: LabelValue {
                    start: span.start,
                    end: span.end,
                    text: char_slice(text, span.start, span.end).to_string(),
                    labels: vec![span.label],
                },
            })
            .collect();
        PredictResponse { result }
    }

    fn predict_one(&self, request: &PredictRequest) -> Result<PredictResponse> {
        let text = request
            .data
            .get(&self.config.input_key)
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::MissingInputKey {
                key: self.config.input_key.clone(),
            })?;
        Ok(self.predict_text(text))
    }
}

impl Backend for Predictor {
    fn predict(&self, requests: &[PredictRequest]) -> Vec<TaskPrediction> {
        requests
            .iter()
            .map(|request| {
                let result = self.predict_one(request);
                if let Err(err) = &result {
                    warn!(id = ?request.id, error = %err, "prediction failed");
                }
                TaskPrediction {
                    id: request.id.clone(),
                    result,
                }
            })
            .collect()
    }

    fn fit(&self, corpus: &Corpus) -> Result<FitOutcome> {
        debug!(docs = corpus.len(), "fit requested; lexicon backend does not train");
        Ok(FitOutcome {
            trained: false,
            documents: corpus.len(),
        })
    }
}
