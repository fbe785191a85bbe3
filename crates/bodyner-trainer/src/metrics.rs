//! Entity-level evaluation.

use std::collections::BTreeSet;
use std::fmt;

use bodyner_core::predict::Recognizer;
use bodyner_core::{BilouTag, Corpus, EntitySpan, GoldDocument};
use serde::Serialize;

/// Exact-match entity counts and the derived precision, recall and F1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Scores {
    #[serde(rename = "tp")]
    pub true_positives: usize,
    #[serde(rename = "fp")]
    pub false_positives: usize,
    #[serde(rename = "fn")]
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Scores {
    pub fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
        let ratio = |num: usize, den: usize| {
            if den == 0 { 0.0 } else { num as f64 / den as f64 }
        };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            precision,
            recall,
            f1,
        }
    }
}

impl fmt::Display for Scores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P {:.2}% R {:.2}% F1 {:.2}% (tp {}, fp {}, fn {})",
            self.precision * 100.0,
            self.recall * 100.0,
            self.f1 * 100.0,
            self.true_positives,
            self.false_positives,
            self.false_negatives,
        )
    }
}

/// Character ranges of tokens tagged `Missing`; predictions there are not scored.
fn unscored_ranges(doc: &GoldDocument) -> Vec<(usize, usize)> {
    doc.tokens()
        .iter()
        .zip(doc.tags())
        .filter(|(_, tag)| **tag == BilouTag::Missing)
        .map(|(t, _)| (t.start, t.end))
        .collect()
}

/// Score `model` against the gold entities of `corpus`.
pub fn evaluate<R: Recognizer + ?Sized>(model: &R, corpus: &Corpus) -> Scores {
    let (mut tp, mut fp, mut fn_) = (0, 0, 0);

    for doc in corpus {
        let gold: BTreeSet<&EntitySpan> = doc.entities().iter().collect();
        let unscored = unscored_ranges(doc);
        let predicted: Vec<EntitySpan> = model
            .recognize(doc.tokens())
            .into_iter()
            .filter(|p| !unscored.iter().any(|&(s, e)| p.start < e && s < p.end))
            .collect();

        let hits = predicted.iter().filter(|p| gold.contains(p)).count();
        tp += hits;
        fp += predicted.len() - hits;
        fn_ += gold.len() - hits;
    }

    Scores::from_counts(tp, fp, fn_)
}
