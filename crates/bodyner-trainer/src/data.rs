//! Reading and writing the pipeline's JSON files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bodyner_core::corpus::{corpus_from_training_json, to_training_json};
use bodyner_core::tagging::{AlignOptions, tags_from_offsets};
use bodyner_core::{Corpus, GoldDocument, TextAnalyzer, WeakExample};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Parse a JSON file.
pub fn read_json(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Write `value` as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Write a corpus in the training-file format.
pub fn write_corpus(path: impl AsRef<Path>, corpus: &Corpus) -> Result<()> {
    write_json(path, &to_training_json(corpus))
}

/// Load a corpus from a training file or a weak-label file. Weak examples
/// are tokenized with `analyzer` and converted to BILOU tags; examples with
/// overlapping entities are skipped.
pub fn load_corpus(path: impl AsRef<Path>, analyzer: &dyn TextAnalyzer) -> Result<Corpus> {
    let path = path.as_ref();
    let value = read_json(path)?;

    let is_weak = value
        .as_array()
        .and_then(|items| items.first())
        .is_some_and(Value::is_array);

    let corpus = if is_weak {
        let examples: Vec<WeakExample> = serde_json::from_value(value)
            .with_context(|| format!("{} is not a weak-label file", path.display()))?;
        corpus_from_weak(&examples, analyzer)
    } else {
        corpus_from_training_json(&value)
            .with_context(|| format!("{} is not a training file", path.display()))?
    };

    info!(
        "Loaded {} docs with {} entities from {}",
        corpus.len(),
        corpus.entity_count(),
        path.display()
    );
    Ok(corpus)
}

fn corpus_from_weak(examples: &[WeakExample], analyzer: &dyn TextAnalyzer) -> Corpus {
    let mut corpus = Corpus::default();
    for (i, example) in examples.iter().enumerate() {
        let tokens = analyzer.analyze(&example.text);
        let alignment = tags_from_offsets(
            &example.text,
            &tokens,
            &example.entities,
            AlignOptions::default(),
        );
        if alignment.overlapping {
            warn!(example = i, "skipping weak example with overlapping entities");
            continue;
        }
        match GoldDocument::new(i.to_string(), example.text.clone(), tokens, alignment.tags) {
            Ok(doc) => corpus.push(doc),
            Err(err) => warn!(example = i, error = %err, "skipping weak example"),
        }
    }
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodyner_core::{BODY_PART, BilouTag, EntitySpan, RuleAnalyzer};

    #[test]
    fn test_load_weak_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weak.json");
        let examples = vec![
            WeakExample {
                text: "my knee hurts".into(),
                entities: vec![EntitySpan::new(3, 7, BODY_PART)],
            },
            WeakExample {
                text: "nothing here".into(),
                entities: Vec::new(),
            },
        ];
        write_json(&path, &examples).unwrap();

        let analyzer = RuleAnalyzer::new().unwrap();
        let corpus = load_corpus(&path, &analyzer).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.docs()[0].tags()[1], BilouTag::Unit(BODY_PART.into()));
        assert_eq!(corpus.entity_count(), 1);
    }

    #[test]
    fn test_weak_example_with_stray_span_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weak.json");
        write_json(
            &path,
            &[WeakExample {
                text: "my lower back hurts".into(),
                entities: vec![
                    EntitySpan::new(3, 13, BODY_PART),
                    EntitySpan::new(10, 10, BODY_PART),
                ],
            }],
        )
        .unwrap();

        let analyzer = RuleAnalyzer::new().unwrap();
        let corpus = load_corpus(&path, &analyzer).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.docs()[0].tags()[1], BilouTag::Missing);
        assert_eq!(corpus.docs()[0].tags()[2], BilouTag::Missing);
    }

    #[test]
    fn test_load_training_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let weak = dir.path().join("weak.json");
        write_json(
            &weak,
            &[WeakExample {
                text: "sore wrist".into(),
                entities: vec![EntitySpan::new(5, 10, BODY_PART)],
            }],
        )
        .unwrap();
        let analyzer = RuleAnalyzer::new().unwrap();
        let corpus = load_corpus(&weak, &analyzer).unwrap();

        let train = dir.path().join("train.json");
        write_corpus(&train, &corpus).unwrap();
        let back = load_corpus(&train, &analyzer).unwrap();
        assert_eq!(back.docs()[0].entities(), corpus.docs()[0].entities());
    }

    #[test]
    fn test_missing_file_has_context() {
        let analyzer = RuleAnalyzer::new().unwrap();
        let err = load_corpus("/nonexistent/train.json", &analyzer).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
