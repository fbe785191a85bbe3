//! # Training File Format
//!
//! Gold corpora are written as a one-element array holding a document with
//! one paragraph per gold document, each paragraph a single sentence of
//! tokens carrying their BILOU `ner` tag:
//!
//! ```json
//! [{ "id": 0, "paragraphs": [{ "raw": "...", "sentences": [{ "tokens": [
//!     { "id": 0, "orth": "knee", "tag": "NOUN", "lemma": "knee", "head": 0, "dep": "", "ner": "U-BODY_PART" }
//! ], "brackets": [] }], "cats": [] }] }]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::corpus::document::{Corpus, GoldDocument};
use crate::error::{CoreError, Result};
use crate::tagging::BilouTag;
use crate::text::{Pos, Token};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileDoc {
    id: usize,
    paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Paragraph {
    raw: String,
    sentences: Vec<Sentence>,
    #[serde(default)]
    cats: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Sentence {
    tokens: Vec<TokenRecord>,
    #[serde(default)]
    brackets: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenRecord {
    id: usize,
    orth: String,
    #[serde(default)]
    tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lemma: Option<String>,
    #[serde(default)]
    head: i64,
    #[serde(default)]
    dep: String,
    #[serde(default = "outside")]
    ner: String,
}

fn outside() -> String {
    "O".to_string()
}

/// Serialize a corpus into the training-file structure.
pub fn to_training_json(corpus: &Corpus) -> Value {
    let paragraphs = corpus
        .iter()
        .map(|doc| Paragraph {
            raw: doc.text().to_string(),
            sentences: vec![Sentence {
                tokens: doc
                    .tokens()
                    .iter()
                    .zip(doc.tags())
                    .enumerate()
                    .map(|(i, (token, tag))| TokenRecord {
                        id: i,
                        orth: token.text.clone(),
                        tag: token.pos.to_string(),
                        lemma: Some(token.lemma.clone()),
                        head: 0,
                        dep: String::new(),
                        ner: tag.to_string(),
                    })
                    .collect(),
                brackets: Vec::new(),
            }],
            cats: Vec::new(),
        })
        .collect();

    let doc = FileDoc { id: 0, paragraphs };
    serde_json::json!([doc])
}

/// Read a training file back into a corpus.
///
/// Token offsets are re-derived by locating each `orth` in `raw`, left to right.
///
/// # Errors
///
/// `Json` for structural problems, `InvalidCorpus` when a token cannot be
/// found in its paragraph text, and tag errors from [`GoldDocument::new`].
pub fn corpus_from_training_json(value: &Value) -> Result<Corpus> {
    let file: Vec<FileDoc> = serde_json::from_value(value.clone())?;

    let mut corpus = Corpus::default();
    for paragraph in file.into_iter().flat_map(|d| d.paragraphs) {
        let id = corpus.len().to_string();
        let records: Vec<TokenRecord> = paragraph
            .sentences
            .into_iter()
            .flat_map(|s| s.tokens)
            .collect();

        let offsets = locate_tokens(&paragraph.raw, records.iter().map(|r| r.orth.as_str()))
            .map_err(|orth| {
                CoreError::InvalidCorpus(format!(
                    "token {orth:?} not found in paragraph {id} text"
                ))
            })?;

        let mut tokens = Vec::with_capacity(records.len());
        let mut tags = Vec::with_capacity(records.len());
        for (index, (record, (start, end))) in records.into_iter().zip(offsets).enumerate() {
            let pos = record.tag.parse().unwrap_or(Pos::X);
            let lemma = record.lemma.unwrap_or_else(|| record.orth.to_lowercase());
            tokens.push(Token::new(record.orth, start, end, index).tagged(pos, lemma));
            tags.push(record.ner.parse::<BilouTag>()?);
        }

        corpus.push(GoldDocument::new(id, paragraph.raw, tokens, tags)?);
    }

    Ok(corpus)
}

/// Character offsets of each token, searched sequentially. Returns the first
/// token that cannot be found.
fn locate_tokens<'a>(
    raw: &str,
    orths: impl Iterator<Item = &'a str>,
) -> std::result::Result<Vec<(usize, usize)>, String> {
    let mut offsets = Vec::new();
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for orth in orths {
        let found = raw[byte_cursor..]
            .find(orth)
            .filter(|_| !orth.is_empty())
            .ok_or_else(|| orth.to_string())?;
        let skipped = &raw[byte_cursor..byte_cursor + found];
        let start = char_cursor + skipped.chars().count();
        let end = start + orth.chars().count();
        offsets.push((start, end));

        byte_cursor += found + orth.len();
        char_cursor = end;
    }

    Ok(offsets)
}
