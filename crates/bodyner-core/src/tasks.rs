//! # Task Builder
//!
//! Reads forum entries into [`TextRecord`]s and keeps the ones worth sending
//! to human annotators: those with at least one lexicon match.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::matcher::Matcher;
use crate::text::TextAnalyzer;
use crate::types::{LabelingTask, TextField, TextRecord};

/// Extract text records from a JSON array of forum entries.
///
/// Each entry contributes one record per string field among `selftext` and
/// `body`. Both fields present means two independent records.
///
/// # Errors
///
/// Returns `CoreError::InvalidCorpus` if `corpus` is not a JSON array.
pub fn extract_records(corpus: &Value) -> Result<Vec<TextRecord>> {
    let entries = corpus
        .as_array()
        .ok_or_else(|| CoreError::InvalidCorpus("expected a JSON array of entries".into()))?;

    let mut records = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        let Some(object) = entry.as_object() else {
            debug!(index = idx, "skipping non-object corpus entry");
            continue;
        };

        let entry_id = match object.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => idx.to_string(),
        };

        for field in TextField::ALL {
            match object.get(field.key()) {
                Some(Value::String(text)) => {
                    records.push(TextRecord::new(format!("{entry_id}:{field}"), field, text.clone()));
                }
                Some(other) => {
                    debug!(index = idx, %field, kind = ?other, "ignoring non-string text field");
                }
                None => {}
            }
        }
    }

    Ok(records)
}

/// Tasks produced from a batch of records.
#[derive(Debug, Clone, Default)]
pub struct TaskBatch {
    pub tasks: Vec<LabelingTask>,
    /// Number of records examined.
    pub considered: usize,
}

/// Runs analyzer + matcher over records and keeps the matching ones.
pub struct TaskBuilder {
    analyzer: Arc<dyn TextAnalyzer>,
    matcher: Matcher,
}

impl TaskBuilder {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>, matcher: Matcher) -> Self {
        Self { analyzer, matcher }
    }

    /// Returns `true` if the text contains at least one candidate span.
    pub fn has_candidates(&self, text: &str) -> bool {
        let tokens = self.analyzer.analyze(text);
        tokens.iter().any(|t| self.matcher.is_match(t))
    }

    pub fn build(&self, records: &[TextRecord]) -> TaskBatch {
        let tasks: Vec<LabelingTask> = records
            .iter()
            .filter(|r| self.has_candidates(&r.text))
            .map(|r| LabelingTask::new(r.text.clone()))
            .collect();

        info!("{} tasks created from {} docs.", tasks.len(), records.len());

        TaskBatch {
            tasks,
            considered: records.len(),
        }
    }
}

/// Render tasks as the annotation tool's import array.
pub fn tasks_to_json(tasks: &[LabelingTask], key: &str) -> Value {
    Value::Array(tasks.iter().map(|t| t.to_json(key)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::text::RuleAnalyzer;
    use proptest::prelude::*;
    use serde_json::json;

    fn builder() -> TaskBuilder {
        let analyzer: Arc<dyn TextAnalyzer> = Arc::new(RuleAnalyzer::new().unwrap());
        TaskBuilder::new(analyzer, Matcher::new(Arc::new(Lexicon::body_parts())))
    }

    #[test]
    fn test_extract_both_fields() {
        let corpus = json!([
            { "selftext": "Hips feel tight", "body": "Try pigeon pose" },
            { "body": "My knee hurts." },
            { "title": "no text here" },
            "not an object",
            { "body": 42 }
        ]);
        let records = extract_records(&corpus).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "0:selftext");
        assert_eq!(records[1].id, "0:body");
        assert_eq!(records[1].field, TextField::Body);
        assert_eq!(records[2].text, "My knee hurts.");
    }

    #[test]
    fn test_extract_uses_entry_id() {
        let corpus = json!([{ "id": "t3_abc", "body": "wrist pain" }]);
        let records = extract_records(&corpus).unwrap();
        assert_eq!(records[0].id, "t3_abc:body");
    }

    #[test]
    fn test_extract_rejects_non_array() {
        let err = extract_records(&json!({ "body": "x" })).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCorpus(_)));
    }

    #[test]
    fn test_build_keeps_only_matching() {
        let records = vec![
            TextRecord::new("0:body", TextField::Body, "My knee hurts and my wrist too."),
            TextRecord::new("1:body", TextField::Body, "Namaste everyone"),
        ];
        let batch = builder().build(&records);

        assert_eq!(batch.considered, 2);
        assert_eq!(batch.tasks, vec![LabelingTask::new("My knee hurts and my wrist too.")]);
        assert_eq!(
            tasks_to_json(&batch.tasks, "reddit"),
            json!([{ "reddit": "My knee hurts and my wrist too." }])
        );
    }

    proptest! {
        #[test]
        fn prop_tasks_are_filtered_subset(texts in prop::collection::vec(
            prop::sample::select(vec![
                "my knee hurts",
                "breathe deeply",
                "I love yoga",
                "the feet are sore",
                "",
                "stretch the mat",
            ]),
            0..12,
        )) {
            let records: Vec<TextRecord> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| TextRecord::new(i.to_string(), TextField::Body, *t))
                .collect();
            let b = builder();
            let batch = b.build(&records);

            prop_assert!(batch.tasks.len() <= records.len());
            prop_assert_eq!(batch.considered, records.len());
            for task in &batch.tasks {
                prop_assert!(b.has_candidates(&task.text));
            }
        }
    }
}
