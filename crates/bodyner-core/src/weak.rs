//! # Weak Labeler
//!
//! Turns raw records into silver training examples straight from the lexicon
//! matcher, without human review. Serialized as
//! `[text, {"entities": [[start, end, label], ...]}]`.

use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

use crate::matcher::Matcher;
use crate::text::TextAnalyzer;
use crate::types::{EntitySpan, TextRecord};

/// A text with matcher-produced entity offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakExample {
    pub text: String,
    pub entities: Vec<EntitySpan>,
}

#[derive(Serialize, Deserialize)]
struct EntitiesWire {
    entities: Vec<(usize, usize, String)>,
}

impl Serialize for WeakExample {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let wire = EntitiesWire {
            entities: self
                .entities
                .iter()
                .map(|e| (e.start, e.end, e.label.clone()))
                .collect(),
        };
        (&self.text, wire).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeakExample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (text, wire) = <(String, EntitiesWire)>::deserialize(deserializer)?;
        let entities = wire
            .entities
            .into_iter()
            .map(|(start, end, label)| {
                if start > end {
                    Err(D::Error::custom(format!("entity start {start} after end {end}")))
                } else {
                    Ok(EntitySpan::new(start, end, label))
                }
            })
            .collect::<std::result::Result<_, _>>()?;
        Ok(Self { text, entities })
    }
}

pub struct WeakLabeler {
    analyzer: Arc<dyn TextAnalyzer>,
    matcher: Matcher,
}

impl WeakLabeler {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>, matcher: Matcher) -> Self {
        Self { analyzer, matcher }
    }

    /// One example per record; records without matches keep an empty entity list.
    pub fn label(&self, records: &[TextRecord]) -> Vec<WeakExample> {
        let examples: Vec<WeakExample> = records
            .iter()
            .map(|r| WeakExample {
                text: r.text.clone(),
                entities: self.matcher.find(&self.analyzer.analyze(&r.text)),
            })
            .collect();

        let entity_count: usize = examples.iter().map(|e| e.entities.len()).sum();
        info!("{} weak entities in {} docs.", entity_count, examples.len());
        examples
    }
}
