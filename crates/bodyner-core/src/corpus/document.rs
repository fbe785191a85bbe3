use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::tagging::{BilouTag, spans_from_tags};
use crate::text::Token;
use crate::types::EntitySpan;

/// A text with its tokens and a 1:1 aligned BILOU tag sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoldDocument {
    id: String,
    text: String,
    tokens: Vec<Token>,
    tags: Vec<BilouTag>,
    entities: Vec<EntitySpan>,
}

impl GoldDocument {
    /// Build a document, checking that the tags fit the tokens.
    ///
    /// # Errors
    ///
    /// `LengthMismatch` when the counts differ and `InvalidTagSequence` when
    /// the tags do not describe well-formed entities.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        tokens: Vec<Token>,
        tags: Vec<BilouTag>,
    ) -> Result<Self> {
        if tokens.len() != tags.len() {
            return Err(CoreError::LengthMismatch {
                tokens: tokens.len(),
                tags: tags.len(),
            });
        }
        let entities = spans_from_tags(&tokens, &tags)?;
        Ok(Self {
            id: id.into(),
            text: text.into(),
            tokens,
            tags,
            entities,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tags(&self) -> &[BilouTag] {
        &self.tags
    }

    /// Gold entity spans recovered from the tags.
    pub fn entities(&self) -> &[EntitySpan] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of tokens tagged `Missing`.
    pub fn missing_count(&self) -> usize {
        self.tags.iter().filter(|t| **t == BilouTag::Missing).count()
    }
}

/// An ordered collection of gold documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Corpus {
    docs: Vec<GoldDocument>,
}

impl Corpus {
    pub fn new(docs: Vec<GoldDocument>) -> Self {
        Self { docs }
    }

    pub fn docs(&self) -> &[GoldDocument] {
        &self.docs
    }

    pub fn into_docs(self) -> Vec<GoldDocument> {
        self.docs
    }

    pub fn push(&mut self, doc: GoldDocument) {
        self.docs.push(doc);
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GoldDocument> {
        self.docs.iter()
    }

    /// Sum of gold spans over all documents.
    pub fn entity_count(&self) -> usize {
        self.docs.iter().map(GoldDocument::entity_count).sum()
    }
}

impl FromIterator<GoldDocument> for Corpus {
    fn from_iter<I: IntoIterator<Item = GoldDocument>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a GoldDocument;
    type IntoIter = std::slice::Iter<'a, GoldDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}
