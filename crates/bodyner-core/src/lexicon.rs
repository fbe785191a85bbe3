//! # Body-part Lexicon
//!
//! The closed vocabulary of lemmas the matcher looks for. Built once and
//! shared read-only (usually behind an `Arc`) by every stage that matches.

use std::collections::BTreeSet;

/// Default body-part lemmas.
pub const BODY_PARTS: &[&str] = &[
    "face", "eye", "nose", "mouth", "ear", "cheek", "chin", "nostril", "lip", "arm", "hand",
    "finger", "palm", "wrist", "forearm", "elbow", "shoulder", "thumb", "nail", "knuckle", "leg",
    "knee", "shin", "calf", "ankle", "heel", "foot", "toe", "heart", "lung", "vein", "brain",
    "throat", "liver", "stomach", "kidney", "skeleton", "rib", "bone", "skin", "chest", "head",
    "forehead", "neck", "hip", "thigh", "hair", "tongue", "tooth", "back", "waist", "muscle",
    "wrinkle",
];

/// A case-insensitive set of lemmas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    entries: BTreeSet<String>,
}

impl Lexicon {
    /// Build a lexicon from arbitrary entries. Entries are lower-cased and trimmed;
    /// blank entries are ignored.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { entries }
    }

    /// The default body-part vocabulary.
    pub fn body_parts() -> Self {
        Self::new(BODY_PARTS.iter().copied())
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, lemma: &str) -> bool {
        if self.entries.contains(lemma) {
            return true;
        }
        self.entries.contains(&lemma.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::body_parts()
    }
}
