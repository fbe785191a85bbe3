//! # BILOU Tags for Named Entity Recognition
//!
//! Defines the token-level tag set used for gold data and decoding:
//! Begin, Inside, Last, Unit and Outside, each entity tag carrying its label,
//! plus `Missing` for tokens whose gold annotation could not be aligned.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Tag position within an entity, without the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKind {
    Begin,
    Inside,
    Last,
    Unit,
    Outside,
    Missing,
}

impl TagKind {
    fn prefix(&self) -> &'static str {
        match self {
            TagKind::Begin => "B",
            TagKind::Inside => "I",
            TagKind::Last => "L",
            TagKind::Unit => "U",
            TagKind::Outside => "O",
            TagKind::Missing => "-",
        }
    }
}

/// A BILOU tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BilouTag {
    /// First token of a multi-token entity
    Begin(String),
    /// Interior token of a multi-token entity
    Inside(String),
    /// Last token of a multi-token entity
    Last(String),
    /// Single-token entity
    Unit(String),
    /// Token outside every entity
    Outside,
    /// Token whose gold tag is unknown (misaligned annotation)
    Missing,
}

impl BilouTag {
    /// Build a tag from a kind and label. The label is ignored for `Outside`/`Missing`.
    pub fn from_kind(kind: TagKind, label: &str) -> Self {
        match kind {
            TagKind::Begin => BilouTag::Begin(label.to_string()),
            TagKind::Inside => BilouTag::Inside(label.to_string()),
            TagKind::Last => BilouTag::Last(label.to_string()),
            TagKind::Unit => BilouTag::Unit(label.to_string()),
            TagKind::Outside => BilouTag::Outside,
            TagKind::Missing => BilouTag::Missing,
        }
    }

    pub fn kind(&self) -> TagKind {
        match self {
            BilouTag::Begin(_) => TagKind::Begin,
            BilouTag::Inside(_) => TagKind::Inside,
            BilouTag::Last(_) => TagKind::Last,
            BilouTag::Unit(_) => TagKind::Unit,
            BilouTag::Outside => TagKind::Outside,
            BilouTag::Missing => TagKind::Missing,
        }
    }

    /// The entity label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            BilouTag::Begin(l) | BilouTag::Inside(l) | BilouTag::Last(l) | BilouTag::Unit(l) => {
                Some(l)
            }
            BilouTag::Outside | BilouTag::Missing => None,
        }
    }

    pub fn is_entity(&self) -> bool {
        self.label().is_some()
    }

    /// Tags that may start a sequence.
    pub fn can_start(&self) -> bool {
        !matches!(self, BilouTag::Inside(_) | BilouTag::Last(_))
    }

    /// Tags that may end a sequence.
    pub fn can_end(&self) -> bool {
        !matches!(self, BilouTag::Begin(_) | BilouTag::Inside(_))
    }

    /// Check if transitioning from `from` tag to `to` tag is valid.
    ///
    /// After `B-X` or `I-X` only `I-X` or `L-X` may follow; `I-X`/`L-X` may only
    /// follow `B-X` or `I-X`. `Missing` is permissive in both directions.
    pub fn is_valid_transition(from: &BilouTag, to: &BilouTag) -> bool {
        use BilouTag::*;
        match (from, to) {
            (Missing, _) | (_, Missing) => true,
            (Begin(a) | Inside(a), Inside(b) | Last(b)) => a == b,
            (Begin(_) | Inside(_), _) => false,
            (_, Inside(_) | Last(_)) => false,
            _ => true,
        }
    }
}

impl fmt::Display for BilouTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{}-{}", self.kind().prefix(), label),
            None => f.write_str(self.kind().prefix()),
        }
    }
}

impl FromStr for BilouTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "O" | "" => return Ok(BilouTag::Outside),
            "-" => return Ok(BilouTag::Missing),
            _ => {}
        }

        let invalid = || CoreError::InvalidTagSequence {
            index: 0,
            reason: format!("unrecognized tag {s:?}"),
        };
        let (prefix, label) = s.split_once('-').ok_or_else(invalid)?;
        if label.is_empty() {
            return Err(invalid());
        }
        let kind = match prefix {
            "B" => TagKind::Begin,
            "I" => TagKind::Inside,
            "L" | "E" => TagKind::Last,
            "U" | "S" => TagKind::Unit,
            _ => return Err(invalid()),
        };
        Ok(BilouTag::from_kind(kind, label))
    }
}

impl Serialize for BilouTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BilouTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
