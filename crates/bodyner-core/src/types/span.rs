use serde::{Deserialize, Serialize};

/// Label attached to every lexicon match.
pub const BODY_PART: &str = "BODY_PART";

/// A labeled character span `[start, end)` over a text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Entity label, e.g. `BODY_PART`.
    pub label: String,
}

/// A span proposed by the lexicon matcher.
pub type CandidateSpan = EntitySpan;

impl EntitySpan {
    #[must_use]
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Returns `true` if the two spans share at least one character.
    #[must_use]
    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for EntitySpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.start, self.end, self.label)
    }
}
