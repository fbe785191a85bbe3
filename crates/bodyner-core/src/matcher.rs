//! # Lexicon Matcher
//!
//! Flags single tokens whose part of speech is `NOUN` and whose lemma is in
//! the body-part lexicon. Multi-token spans are never produced.

use std::sync::Arc;

use crate::lexicon::Lexicon;
use crate::text::{Pos, Token};
use crate::types::{BODY_PART, CandidateSpan};

/// Pure function of `(tokens, lexicon)`.
#[derive(Debug, Clone)]
pub struct Matcher {
    lexicon: Arc<Lexicon>,
}

impl Matcher {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Returns `true` if the token would be flagged.
    pub fn is_match(&self, token: &Token) -> bool {
        token.pos == Pos::Noun && self.lexicon.contains(&token.lemma)
    }

    /// Candidate spans in token order.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use bodyner_core::{Lexicon, Matcher, RuleAnalyzer, TextAnalyzer};
    ///
    /// let analyzer = RuleAnalyzer::new().unwrap();
    /// let matcher = Matcher::new(Arc::new(Lexicon::body_parts()));
    /// let spans = matcher.find(&analyzer.analyze("My knee hurts and my wrist too."));
    ///
    /// assert_eq!(spans.len(), 2);
    /// assert_eq!((spans[0].start, spans[0].end), (3, 7));
    /// ```
    pub fn find(&self, tokens: &[Token]) -> Vec<CandidateSpan> {
        tokens
            .iter()
            .filter(|t| self.is_match(t))
            .map(|t| CandidateSpan::new(t.start, t.end, BODY_PART))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{RuleAnalyzer, TextAnalyzer};
    use proptest::prelude::*;

    fn matcher() -> Matcher {
        Matcher::new(Arc::new(Lexicon::body_parts()))
    }

    #[test]
    fn test_flags_lexicon_nouns() {
        let analyzer = RuleAnalyzer::new().unwrap();
        let spans = matcher().find(&analyzer.analyze("My knee hurts and my wrist too."));

        assert_eq!(
            spans,
            vec![
                CandidateSpan::new(3, 7, BODY_PART),
                CandidateSpan::new(21, 26, BODY_PART),
            ]
        );
    }

    #[test]
    fn test_plural_lemma_matches() {
        let analyzer = RuleAnalyzer::new().unwrap();
        let spans = matcher().find(&analyzer.analyze("Both feet went numb"));
        assert_eq!(spans, vec![CandidateSpan::new(5, 9, BODY_PART)]);
    }

    #[test]
    fn test_requires_noun() {
        let token = Token::new("back", 0, 4, 0).tagged(Pos::Adv, "back");
        assert!(!matcher().is_match(&token));

        let token = Token::new("back", 0, 4, 0).tagged(Pos::Noun, "back");
        assert!(matcher().is_match(&token));
    }

    #[test]
    fn test_lemma_case_normalized() {
        let token = Token::new("KNEE", 0, 4, 0).tagged(Pos::Noun, "KNEE");
        assert!(matcher().is_match(&token));
    }

    #[test]
    fn test_empty_input() {
        assert!(matcher().find(&[]).is_empty());
    }

    fn arb_token() -> impl Strategy<Value = (String, bool)> {
        (
            prop::sample::select(vec!["knee", "mat", "wrist", "pose", "Hip", "breath"]),
            any::<bool>(),
        )
            .prop_map(|(lemma, noun)| (lemma.to_string(), noun))
    }

    proptest! {
        #[test]
        fn prop_match_is_pure_and_lexicon_bound(specs in prop::collection::vec(arb_token(), 0..20)) {
            let tokens: Vec<Token> = specs
                .iter()
                .enumerate()
                .map(|(i, (lemma, noun))| {
                    let pos = if *noun { Pos::Noun } else { Pos::Verb };
                    Token::new(lemma.clone(), i * 10, i * 10 + lemma.chars().count(), i)
                        .tagged(pos, lemma.clone())
                })
                .collect();

            let m = matcher();
            let first = m.find(&tokens);
            prop_assert_eq!(&first, &m.find(&tokens));

            for span in &first {
                let token = tokens.iter().find(|t| t.start == span.start).unwrap();
                prop_assert!(m.lexicon().contains(&token.lemma));
                prop_assert_eq!(token.pos, Pos::Noun);
                prop_assert_eq!(span.end, token.end);
            }
        }
    }
}
