//! # Offset Alignment
//!
//! Converts character-offset entity spans into a token-aligned BILOU tag
//! sequence and back.
//!
//! Spans whose edges do not fall on token edges are *misaligned*: they are
//! dropped from the gold set and every token they touch is tagged
//! [`BilouTag::Missing`], so a trainer can skip those positions instead of
//! learning them as `O`. An aligned entity sharing a token with a misaligned
//! span is masked and reported as misaligned too, so the tag sequence always
//! decodes. Overlapping spans are reported, not resolved.

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::tagging::bilou::BilouTag;
use crate::text::Token;
use crate::types::EntitySpan;

/// Alignment settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignOptions {
    /// Trim leading/trailing whitespace inside each span before aligning.
    pub trim_whitespace: bool,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            trim_whitespace: true,
        }
    }
}

/// Outcome of aligning one document's spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// One tag per token.
    pub tags: Vec<BilouTag>,
    /// Spans that were tagged, in text order (after trimming).
    pub aligned: Vec<EntitySpan>,
    /// Spans that could not be tagged.
    pub misaligned: Vec<EntitySpan>,
    /// Two or more spans overlap; `tags` is all `Missing` and `aligned` empty.
    pub overlapping: bool,
}

/// Tag `tokens` of `text` from character-offset `spans`.
///
/// # Examples
/// ```
/// use bodyner_core::{AlignOptions, BilouTag, EntitySpan, RuleAnalyzer, TextAnalyzer};
/// use bodyner_core::tagging::tags_from_offsets;
///
/// let text = "My knee hurts";
/// let tokens = RuleAnalyzer::new().unwrap().analyze(text);
/// let spans = [EntitySpan::new(3, 7, "BODY_PART")];
/// let alignment = tags_from_offsets(text, &tokens, &spans, AlignOptions::default());
///
/// assert_eq!(alignment.tags[1], BilouTag::Unit("BODY_PART".into()));
/// assert!(alignment.misaligned.is_empty());
/// ```
pub fn tags_from_offsets(
    text: &str,
    tokens: &[Token],
    spans: &[EntitySpan],
    options: AlignOptions,
) -> Alignment {
    let chars: Vec<char> = text.chars().collect();
    let mut tags = vec![BilouTag::Outside; tokens.len()];

    let mut candidates: Vec<EntitySpan> = spans
        .iter()
        .map(|span| {
            if options.trim_whitespace {
                trim_span(&chars, span)
            } else {
                span.clone()
            }
        })
        .collect();
    candidates.sort();
    candidates.dedup();

    let in_range = |s: &EntitySpan| s.start < s.end && s.end <= chars.len();

    let overlapping = candidates
        .iter()
        .filter(|s| in_range(s))
        .collect::<Vec<_>>()
        .windows(2)
        .any(|w| w[0].overlaps(w[1]));
    if overlapping {
        return Alignment {
            tags: vec![BilouTag::Missing; tokens.len()],
            aligned: Vec::new(),
            misaligned: Vec::new(),
            overlapping: true,
        };
    }

    let by_start: HashMap<usize, usize> =
        tokens.iter().enumerate().map(|(i, t)| (t.start, i)).collect();
    let by_end: HashMap<usize, usize> =
        tokens.iter().enumerate().map(|(i, t)| (t.end, i)).collect();

    let mut placed: Vec<(EntitySpan, usize, usize)> = Vec::new();
    let mut misaligned = Vec::new();
    let mut missing = vec![false; tokens.len()];

    for span in candidates {
        let edges = if in_range(&span) {
            by_start.get(&span.start).zip(by_end.get(&span.end))
        } else {
            None
        };

        match edges {
            Some((&first, &last)) if first <= last => placed.push((span, first, last)),
            _ => {
                for (i, token) in tokens.iter().enumerate() {
                    if token.start < span.end && span.start < token.end {
                        missing[i] = true;
                    }
                }
                misaligned.push(span);
            }
        }
    }

    // An entity touched by a misaligned span is unknown as a whole; a
    // partially masked B..L run would not decode.
    let mut aligned = Vec::new();
    for (span, first, last) in placed {
        if missing[first..=last].iter().any(|m| *m) {
            missing[first..=last].iter_mut().for_each(|m| *m = true);
            misaligned.push(span);
        } else if first == last {
            tags[first] = BilouTag::Unit(span.label.clone());
            aligned.push(span);
        } else {
            tags[first] = BilouTag::Begin(span.label.clone());
            for tag in &mut tags[first + 1..last] {
                *tag = BilouTag::Inside(span.label.clone());
            }
            tags[last] = BilouTag::Last(span.label.clone());
            aligned.push(span);
        }
    }
    misaligned.sort();

    for (tag, _) in tags.iter_mut().zip(&missing).filter(|(_, m)| **m) {
        *tag = BilouTag::Missing;
    }

    Alignment {
        tags,
        aligned,
        misaligned,
        overlapping: false,
    }
}

fn trim_span(chars: &[char], span: &EntitySpan) -> EntitySpan {
    let mut start = span.start;
    let mut end = span.end.min(chars.len());
    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    if span.end > chars.len() {
        // Keep out-of-range spans out of range so they stay misaligned.
        return span.clone();
    }
    EntitySpan::new(start, end, span.label.clone())
}

/// Recover character-offset spans from a tag sequence.
///
/// # Errors
///
/// `LengthMismatch` if lengths differ; `InvalidTagSequence` for ill-formed
/// sequences such as `I` without `B` or a `B` that is never closed.
pub fn spans_from_tags(tokens: &[Token], tags: &[BilouTag]) -> Result<Vec<EntitySpan>> {
    if tokens.len() != tags.len() {
        return Err(CoreError::LengthMismatch {
            tokens: tokens.len(),
            tags: tags.len(),
        });
    }

    let broken = |index: usize, reason: &str| CoreError::InvalidTagSequence {
        index,
        reason: reason.to_string(),
    };

    let mut spans = Vec::new();
    let mut open: Option<(usize, &str)> = None;

    for (i, tag) in tags.iter().enumerate() {
        match tag {
            BilouTag::Begin(label) => {
                if open.is_some() {
                    return Err(broken(i, "B inside an open entity"));
                }
                open = Some((tokens[i].start, label.as_str()));
            }
            BilouTag::Inside(label) => match open {
                Some((_, l)) if l == label.as_str() => {}
                _ => return Err(broken(i, "I without matching B")),
            },
            BilouTag::Last(label) => match open.take() {
                Some((start, l)) if l == label.as_str() => {
                    spans.push(EntitySpan::new(start, tokens[i].end, label.clone()));
                }
                _ => return Err(broken(i, "L without matching B")),
            },
            BilouTag::Unit(label) => {
                if open.is_some() {
                    return Err(broken(i, "U inside an open entity"));
                }
                spans.push(EntitySpan::new(tokens[i].start, tokens[i].end, label.clone()));
            }
            BilouTag::Outside | BilouTag::Missing => {
                if open.is_some() {
                    return Err(broken(i, "entity not closed"));
                }
            }
        }
    }

    if open.is_some() {
        return Err(broken(tags.len(), "entity not closed at end of sequence"));
    }

    Ok(spans)
}
