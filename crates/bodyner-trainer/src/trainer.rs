//! Training loop for the perceptron tagger.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{bail, ensure};
use bodyner_core::{BODY_PART, Corpus, Lexicon};
use oorandom::Rand64;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics::{Scores, evaluate};
use crate::model::PerceptronTagger;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Passes over the training set
    pub epochs: usize,
    /// Probability of ignoring a feature in an update
    pub dropout: f64,
    /// Perceptron step size
    pub learning_rate: f32,
    /// Seed for shuffling and dropout
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            dropout: 0.2,
            learning_rate: 1.0,
            seed: 27,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.epochs > 0, "epochs must be at least 1");
        ensure!(
            (0.0..1.0).contains(&self.dropout),
            "dropout must be within [0, 1), got {}",
            self.dropout
        );
        ensure!(self.learning_rate > 0.0, "learning rate must be positive");
        Ok(())
    }
}

/// Statistics for one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochStats {
    pub epoch: usize,
    pub tokens: usize,
    pub token_errors: usize,
    pub dev: Option<Scores>,
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// The best model: highest dev F1, or the final one without a dev set
    pub model: PerceptronTagger,
    pub epochs: Vec<EpochStats>,
    pub best_epoch: usize,
}

impl TrainingReport {
    pub fn best_scores(&self) -> Option<Scores> {
        self.epochs.get(self.best_epoch).and_then(|e| e.dev)
    }
}

pub struct Trainer {
    config: TrainerConfig,
    lexicon: Arc<Lexicon>,
}

impl Trainer {
    pub fn new(config: TrainerConfig, lexicon: Arc<Lexicon>) -> Self {
        Self { config, lexicon }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train on `train`, scoring each epoch on `dev` when given.
    pub fn train(&self, train: &Corpus, dev: Option<&Corpus>) -> anyhow::Result<TrainingReport> {
        self.config.validate()?;
        if train.is_empty() {
            bail!("training corpus is empty");
        }

        let labels = corpus_labels(train);
        info!(
            "Training on {} docs ({} entities), labels: {}",
            train.len(),
            train.entity_count(),
            labels.join(", ")
        );

        let mut model = PerceptronTagger::new(labels, Arc::clone(&self.lexicon));
        let mut rng = Rand64::new(u128::from(self.config.seed));
        let mut order: Vec<usize> = (0..train.len()).collect();
        let docs = train.docs();

        let mut epochs = Vec::with_capacity(self.config.epochs);
        let mut best: Option<(usize, f64, PerceptronTagger)> = None;

        for epoch in 0..self.config.epochs {
            for i in (1..order.len()).rev() {
                let j = rng.rand_range(0..(i as u64 + 1)) as usize;
                order.swap(i, j);
            }

            let (mut tokens, mut token_errors) = (0, 0);
            for &idx in &order {
                let doc = &docs[idx];
                let (scored, errors) = model.update(
                    doc.tokens(),
                    doc.tags(),
                    self.config.learning_rate,
                    self.config.dropout,
                    &mut rng,
                );
                tokens += scored;
                token_errors += errors;
            }

            let dev_scores = dev.map(|d| evaluate(&model, d));
            match dev_scores {
                Some(scores) => info!(
                    "Epoch {}/{} - token errors {}/{} - dev {}",
                    epoch + 1,
                    self.config.epochs,
                    token_errors,
                    tokens,
                    scores
                ),
                None => info!(
                    "Epoch {}/{} - token errors {}/{}",
                    epoch + 1,
                    self.config.epochs,
                    token_errors,
                    tokens
                ),
            }

            if let Some(scores) = dev_scores {
                if best.as_ref().is_none_or(|(_, f1, _)| scores.f1 > *f1) {
                    best = Some((epoch, scores.f1, model.clone()));
                }
            }

            epochs.push(EpochStats {
                epoch,
                tokens,
                token_errors,
                dev: dev_scores,
            });
        }

        let (best_epoch, model) = match best {
            Some((epoch, _, model)) => (epoch, model),
            None => (epochs.len() - 1, model),
        };
        info!("Keeping model from epoch {}", best_epoch + 1);

        Ok(TrainingReport {
            model,
            epochs,
            best_epoch,
        })
    }
}

/// Labels seen in the corpus, always including `BODY_PART`.
fn corpus_labels(corpus: &Corpus) -> Vec<String> {
    let mut labels: BTreeSet<String> = corpus
        .iter()
        .flat_map(|d| d.entities().iter().map(|e| e.label.clone()))
        .collect();
    labels.insert(BODY_PART.to_string());
    labels.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodyner_core::tagging::{AlignOptions, tags_from_offsets};
    use bodyner_core::{EntitySpan, GoldDocument, RuleAnalyzer, TextAnalyzer};

    fn corpus(examples: &[(&str, &[(usize, usize)])]) -> Corpus {
        let analyzer = RuleAnalyzer::new().unwrap();
        examples
            .iter()
            .enumerate()
            .map(|(i, (text, spans))| {
                let tokens = analyzer.analyze(text);
                let spans: Vec<EntitySpan> = spans
                    .iter()
                    .map(|&(s, e)| EntitySpan::new(s, e, BODY_PART))
                    .collect();
                let tags = tags_from_offsets(text, &tokens, &spans, AlignOptions::default()).tags;
                GoldDocument::new(i.to_string(), *text, tokens, tags).unwrap()
            })
            .collect()
    }

    fn train_corpus() -> Corpus {
        corpus(&[
            ("my knee hurts", &[(3, 7)]),
            ("sore wrist today", &[(5, 10)]),
            ("tight hips after class", &[(6, 10)]),
            ("my neck is stiff", &[(3, 7)]),
            ("the class was great", &[]),
            ("my lower back aches", &[(3, 13)]),
        ])
    }

    #[test]
    fn test_default_config() {
        let config = TrainerConfig::default();
        assert_eq!(config.epochs, 10);
        assert_eq!(config.seed, 27);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = TrainerConfig {
            dropout: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = TrainerConfig {
            epochs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let trainer = Trainer::new(TrainerConfig::default(), Arc::new(Lexicon::body_parts()));
        assert!(trainer.train(&Corpus::default(), None).is_err());
    }

    #[test]
    fn test_training_fits_train_set() {
        let config = TrainerConfig {
            epochs: 15,
            dropout: 0.0,
            ..Default::default()
        };
        let trainer = Trainer::new(config, Arc::new(Lexicon::body_parts()));
        let train = train_corpus();

        let report = trainer.train(&train, Some(&train)).unwrap();
        assert_eq!(report.epochs.len(), 15);
        assert!(report.best_scores().unwrap().f1 > 0.8);
        assert!(evaluate(&report.model, &train).f1 > 0.8);
    }

    #[test]
    fn test_training_is_deterministic() {
        let trainer = Trainer::new(TrainerConfig::default(), Arc::new(Lexicon::body_parts()));
        let train = train_corpus();

        let a = trainer.train(&train, None).unwrap();
        let b = trainer.train(&train, None).unwrap();
        assert_eq!(a.epochs, b.epochs);
        assert_eq!(a.best_epoch, 9);
        assert!(a.best_scores().is_none());
    }

    #[test]
    fn test_corpus_labels() {
        assert_eq!(corpus_labels(&Corpus::default()), vec![BODY_PART.to_string()]);
    }
}
