//! # Annotation Reconciler
//!
//! Turns an annotation export into a gold corpus. Each task is filtered
//! (unannotated, multiply annotated, cancelled, missing text, overlapping
//! spans), re-tokenized with the shared analyzer, and its character spans
//! converted to a BILOU tag sequence. Every drop is counted rather than
//! raised; only unreadable input is an error.

use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::annotation::export::{ExportTask, load_export, read_archive};
use crate::corpus::{Corpus, GoldDocument};
use crate::error::Result;
use crate::tagging::{AlignOptions, tags_from_offsets};
use crate::text::TextAnalyzer;

/// Options for reconciliation.
pub type ReconcileOptions = AlignOptions;

/// Counters for one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub accepted_docs: usize,
    pub dropped_cancelled: usize,
    pub dropped_multi_completion: usize,
    pub dropped_unannotated: usize,
    pub dropped_missing_text: usize,
    pub dropped_overlapping: usize,
    pub dropped_invalid_tags: usize,
    pub entity_count: usize,
    pub misaligned_count: usize,
}

impl ReconcileStats {
    /// Total tasks dropped for any reason.
    pub fn dropped(&self) -> usize {
        self.dropped_cancelled
            + self.dropped_multi_completion
            + self.dropped_unannotated
            + self.dropped_missing_text
            + self.dropped_overlapping
            + self.dropped_invalid_tags
    }
}

impl fmt::Display for ReconcileStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} docs accepted, {} entities, {} misaligned spans; dropped: {} cancelled, {} multi-completion, {} unannotated, {} missing text, {} overlapping, {} invalid tags",
            self.accepted_docs,
            self.entity_count,
            self.misaligned_count,
            self.dropped_cancelled,
            self.dropped_multi_completion,
            self.dropped_unannotated,
            self.dropped_missing_text,
            self.dropped_overlapping,
            self.dropped_invalid_tags,
        )
    }
}

/// A gold corpus together with the counters that produced it.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub corpus: Corpus,
    pub stats: ReconcileStats,
}

/// Converts exported annotations into token-aligned gold documents.
pub struct Reconciler {
    analyzer: Arc<dyn TextAnalyzer>,
    input_key: String,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>, input_key: impl Into<String>) -> Self {
        Self {
            analyzer,
            input_key: input_key.into(),
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Reconcile an export file (zip archive or bare JSON).
    pub fn reconcile_path(&self, path: impl AsRef<Path>) -> Result<Reconciliation> {
        let tasks = load_export(path)?;
        Ok(self.reconcile_tasks(&tasks))
    }

    /// Reconcile the `result.json` inside a zip archive.
    pub fn reconcile_archive<R: Read + Seek>(&self, reader: R) -> Result<Reconciliation> {
        let tasks = read_archive(reader)?;
        Ok(self.reconcile_tasks(&tasks))
    }

    /// Reconcile already-parsed export tasks. Input order is preserved.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use bodyner_core::RuleAnalyzer;
    /// use bodyner_core::annotation::{Reconciler, parse_export};
    ///
    /// let tasks = parse_export(r#"[{
    ///     "data": {"reddit": "My knee hurts"},
    ///     "completions": [{"result": [{"value": {"start": 3, "end": 7, "labels": ["BODY_PART"]}}]}]
    /// }]"#).unwrap();
    ///
    /// let reconciler = Reconciler::new(Arc::new(RuleAnalyzer::new().unwrap()), "reddit");
    /// let out = reconciler.reconcile_tasks(&tasks);
    /// assert_eq!(out.stats.accepted_docs, 1);
    /// assert_eq!(out.corpus.docs()[0].tags()[1].to_string(), "U-BODY_PART");
    /// ```
    pub fn reconcile_tasks(&self, tasks: &[ExportTask]) -> Reconciliation {
        let mut stats = ReconcileStats::default();
        let mut corpus = Corpus::default();

        for (index, task) in tasks.iter().enumerate() {
            let id = task.id_or(index);

            let completion = match task.completions.as_slice() {
                [] => {
                    debug!(task = %id, "no completions");
                    stats.dropped_unannotated += 1;
                    continue;
                }
                [completion] => completion,
                _ => {
                    debug!(task = %id, count = task.completions.len(), "multiple completions");
                    stats.dropped_multi_completion += 1;
                    continue;
                }
            };

            if completion.is_cancelled() {
                debug!(task = %id, "cancelled");
                stats.dropped_cancelled += 1;
                continue;
            }

            let Some(text) = task.text(&self.input_key) else {
                warn!(task = %id, key = %self.input_key, "task has no source text");
                stats.dropped_missing_text += 1;
                continue;
            };

            let (spans, unreadable) = completion.spans();
            let tokens = self.analyzer.analyze(text);
            let alignment = tags_from_offsets(text, &tokens, &spans, self.options);

            if alignment.overlapping {
                debug!(task = %id, "overlapping spans");
                stats.dropped_overlapping += 1;
                continue;
            }

            for span in &alignment.misaligned {
                debug!(task = %id, span = %span, "span does not align to tokens");
            }

            stats.misaligned_count += unreadable + alignment.misaligned.len();

            // Rejects tag sequences that do not decode into whole entities.
            match GoldDocument::new(id.clone(), text, tokens, alignment.tags) {
                Ok(doc) => {
                    stats.entity_count += doc.entity_count();
                    stats.accepted_docs += 1;
                    corpus.push(doc);
                }
                Err(err) => {
                    warn!(task = %id, error = %err, "could not build gold document");
                    stats.dropped_invalid_tags += 1;
                }
            }
        }

        info!("{} entities in {} docs.", stats.entity_count, stats.accepted_docs);
        Reconciliation { corpus, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::export::parse_export;
    use crate::tagging::BilouTag;
    use crate::text::RuleAnalyzer;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn reconciler() -> Reconciler {
        Reconciler::new(Arc::new(RuleAnalyzer::new().unwrap()), "reddit")
    }

    fn labeled(start: i64, end: i64) -> Value {
        json!({ "value": { "start": start, "end": end, "labels": ["BODY_PART"] } })
    }

    fn task(text: &str, completions: Value) -> Value {
        json!({ "data": { "reddit": text }, "completions": completions })
    }

    fn run(tasks: Value) -> Reconciliation {
        reconciler().reconcile_tasks(&parse_export(&tasks.to_string()).unwrap())
    }

    fn tag_strings(doc: &GoldDocument) -> Vec<String> {
        doc.tags().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_two_entities() {
        let out = run(json!([task(
            "My knee hurts and my wrist too.",
            json!([{ "result": [labeled(3, 7), labeled(21, 26)] }])
        )]));

        assert_eq!(out.stats.accepted_docs, 1);
        assert_eq!(out.stats.entity_count, 2);
        assert_eq!(
            tag_strings(&out.corpus.docs()[0]),
            vec!["O", "U-BODY_PART", "O", "O", "O", "U-BODY_PART", "O", "O"]
        );
    }

    #[test]
    fn test_multi_token_entity() {
        let out = run(json!([task(
            "my lower back aches",
            json!([{ "result": [labeled(3, 13)] }])
        )]));
        let doc = &out.corpus.docs()[0];
        assert_eq!(tag_strings(doc), vec!["O", "B-BODY_PART", "L-BODY_PART", "O"]);
    }

    #[test]
    fn test_filtering_order_and_counts() {
        let out = run(json!([
            task("no one looked", json!([])),
            task("two looks", json!([{ "result": [] }, { "result": [] }])),
            task("skip me", json!([{ "was_cancelled": true, "result": [] }])),
            { "data": { "text": "wrong key" }, "completions": [{ "result": [] }] },
            task("knee", json!([{ "result": [labeled(0, 4), labeled(1, 3)] }])),
            task("fine", json!([{ "was_cancelled": false, "result": [] }])),
        ]));

        let stats = out.stats;
        assert_eq!(stats.dropped_unannotated, 1);
        assert_eq!(stats.dropped_multi_completion, 1);
        assert_eq!(stats.dropped_cancelled, 1);
        assert_eq!(stats.dropped_missing_text, 1);
        assert_eq!(stats.dropped_overlapping, 1);
        assert_eq!(stats.accepted_docs, 1);
        assert_eq!(stats.dropped(), 5);
        assert_eq!(out.corpus.docs()[0].id(), "5");
    }

    #[test]
    fn test_misaligned_span_is_counted() {
        let out = run(json!([task(
            "My knee hurts",
            json!([{ "result": [labeled(4, 7), { "value": { "start": 0 } }] }])
        )]));

        let doc = &out.corpus.docs()[0];
        assert_eq!(out.stats.misaligned_count, 2);
        assert_eq!(out.stats.entity_count, 0);
        assert_eq!(doc.tags()[1], BilouTag::Missing);
        assert_eq!(doc.tags()[0], BilouTag::Outside);
    }

    #[test]
    fn test_stray_span_inside_entity_keeps_document() {
        let out = run(json!([
            task("my lower back hurts", json!([{ "result": [labeled(3, 13), labeled(9, 100)] }])),
            task("my lower back hurts", json!([{ "result": [labeled(3, 13), labeled(10, 10)] }])),
        ]));

        assert_eq!(out.stats.accepted_docs, 2);
        assert_eq!(out.stats.dropped(), 0);
        assert_eq!(out.stats.entity_count, 0);
        assert_eq!(out.stats.misaligned_count, 4);
        for doc in out.corpus.iter() {
            assert_eq!(tag_strings(doc)[..3], ["O", "-", "-"]);
        }
    }

    #[test]
    fn test_cancelled_before_missing_text() {
        let out = run(json!([
            { "data": {}, "completions": [{ "was_cancelled": true }] }
        ]));
        assert_eq!(out.stats.dropped_cancelled, 1);
        assert_eq!(out.stats.dropped_missing_text, 0);
    }

    #[test]
    fn test_preserves_input_order() {
        let out = run(json!([
            task("first knee", json!([{ "result": [] }])),
            task("second knee", json!([{ "result": [] }])),
        ]));
        let ids: Vec<&str> = out.corpus.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["0", "1"]);
    }

    #[test]
    fn test_stats_display() {
        let stats = ReconcileStats {
            accepted_docs: 3,
            entity_count: 4,
            ..Default::default()
        };
        assert!(stats.to_string().starts_with("3 docs accepted, 4 entities"));
    }

    fn arb_completion() -> impl Strategy<Value = Value> {
        prop::option::of(any::<bool>()).prop_map(|cancelled| {
            let mut completion = json!({ "result": [labeled(3, 7)] });
            if let Some(flag) = cancelled {
                completion["was_cancelled"] = json!(flag);
            }
            completion
        })
    }

    proptest! {
        #[test]
        fn prop_only_single_live_completions_survive(
            tasks in prop::collection::vec(prop::collection::vec(arb_completion(), 0..4), 1..12)
        ) {
            let export = Value::Array(
                tasks
                    .iter()
                    .map(|completions| task("My knee hurts", json!(completions)))
                    .collect(),
            );
            let out = run(export);

            let expected: Vec<String> = tasks
                .iter()
                .enumerate()
                .filter(|(_, completions)| {
                    completions.len() == 1 && completions[0]["was_cancelled"] != json!(true)
                })
                .map(|(i, _)| i.to_string())
                .collect();
            let ids: Vec<String> = out.corpus.iter().map(|d| d.id().to_string()).collect();

            prop_assert_eq!(&ids, &expected);
            prop_assert_eq!(out.stats.entity_count, expected.len());
            prop_assert_eq!(out.stats.accepted_docs + out.stats.dropped(), tasks.len());
            let multi = tasks.iter().filter(|c| c.len() > 1).count();
            prop_assert_eq!(out.stats.dropped_multi_completion, multi);
        }
    }
}
