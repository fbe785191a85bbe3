use serde::{Deserialize, Serialize};

/// Which field of a forum entry a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextField {
    /// Submission body.
    Selftext,
    /// Comment body.
    Body,
}

impl TextField {
    /// Fields looked up on each entry, in extraction order.
    pub const ALL: [TextField; 2] = [TextField::Selftext, TextField::Body];

    pub fn key(&self) -> &'static str {
        match self {
            TextField::Selftext => "selftext",
            TextField::Body => "body",
        }
    }
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One raw text read from the input corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Stable identifier, `"{entry}:{field}"`.
    pub id: String,
    /// Field the text came from.
    pub field: TextField,
    /// The raw text.
    pub text: String,
}

impl TextRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, field: TextField, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field,
            text: text.into(),
        }
    }
}

/// A text offered to human annotators. Spans are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelingTask {
    pub text: String,
}

impl LabelingTask {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Render as `{ <key>: text }` for the annotation tool's import format.
    pub fn to_json(&self, key: &str) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert(key.to_string(), serde_json::Value::String(self.text.clone()));
        serde_json::Value::Object(object)
    }
}
