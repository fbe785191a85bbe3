//! # Label Configuration
//!
//! Which control/object pair of the annotation tool the recognizer writes
//! to, which labels it emits and which task field holds the source text.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::types::BODY_PART;

/// Task field that carries the source text by default.
pub const DEFAULT_INPUT_KEY: &str = "reddit";

/// Label configuration for prediction and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Name of the labeling control (`from_name` in results)
    pub from_name: String,
    /// Name of the text object the control annotates (`to_name`)
    pub to_name: String,
    /// Labels the backend may emit
    pub labels: Vec<String>,
    /// Key of the source text inside a task's `data`
    pub input_key: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            from_name: "label".to_string(),
            to_name: "text".to_string(),
            labels: vec![BODY_PART.to_string()],
            input_key: DEFAULT_INPUT_KEY.to_string(),
        }
    }
}

impl LabelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input key.
    pub fn with_input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = key.into();
        self
    }

    /// Set the emitted labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn allows(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Check that every field is set.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        let missing = if self.from_name.is_empty() {
            "from_name"
        } else if self.to_name.is_empty() {
            "to_name"
        } else if self.labels.is_empty() {
            "labels"
        } else if self.input_key.is_empty() {
            "input_key"
        } else {
            return Ok(());
        };
        Err(CoreError::InvalidConfig(format!("{missing} is empty")))
    }

    /// Build from the tool's parsed label config:
    /// `{ <from_name>: { "to_name": [..], "inputs": [{ "value": .. }], "labels": [..] } }`.
    /// The first control wins.
    pub fn from_parsed_label_config(parsed: &Value) -> Result<Self> {
        let (from_name, control) = parsed
            .as_object()
            .and_then(|controls| controls.iter().next())
            .ok_or_else(|| CoreError::InvalidConfig("no controls in label config".into()))?;

        let first_str = |field: &str, inner: Option<&str>| -> Option<String> {
            let first = control.get(field)?.as_array()?.first()?;
            match inner {
                Some(key) => first.get(key)?.as_str().map(str::to_string),
                None => first.as_str().map(str::to_string),
            }
        };

        let to_name = first_str("to_name", None)
            .ok_or_else(|| CoreError::InvalidConfig(format!("{from_name} has no to_name")))?;
        let input_key = first_str("inputs", Some("value"))
            .ok_or_else(|| CoreError::InvalidConfig(format!("{from_name} has no inputs")))?;
        let labels: Vec<String> = control
            .get("labels")
            .and_then(Value::as_array)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let config = Self {
            from_name: from_name.clone(),
            to_name,
            labels,
            input_key,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a config file: either a serialized `LabelConfig` or a parsed
    /// label config.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let value: Value = serde_json::from_slice(&fs::read(path.as_ref())?)?;
        let config = if value.get("from_name").is_some() {
            serde_json::from_value::<Self>(value)?
        } else {
            Self::from_parsed_label_config(&value)?
        };
        config.validate()?;
        Ok(config)
    }
}
