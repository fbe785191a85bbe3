//! Text analysis: tokenization, POS tagging and lemmatization.

pub mod tagger;
pub mod tokenizer;

pub use tagger::{Pos, RuleTagger, lemmatize};
pub use tokenizer::{Token, Tokenizer, char_slice};

use crate::error::Result;

/// The NLP engine seam: text in, tagged tokens out.
///
/// Every stage that needs tokens (matching, reconciliation, prediction) goes
/// through this trait, so the same tokenization is used for candidate
/// generation and for aligning human annotations.
pub trait TextAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<Token>;
}

/// Regex tokenizer followed by the rule tagger.
#[derive(Debug, Clone)]
pub struct RuleAnalyzer {
    tokenizer: Tokenizer,
    tagger: RuleTagger,
}

impl RuleAnalyzer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tokenizer: Tokenizer::new()?,
            tagger: RuleTagger::new(),
        })
    }
}

impl TextAnalyzer for RuleAnalyzer {
    fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);
        self.tagger.tag(&mut tokens);
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_tags_and_lemmas() {
        let analyzer = RuleAnalyzer::new().unwrap();
        let tokens = analyzer.analyze("Stretch your calves daily");

        let calves = &tokens[2];
        assert_eq!(calves.text, "calves");
        assert_eq!(calves.pos, Pos::Noun);
        assert_eq!(calves.lemma, "calf");
        assert_eq!(tokens[3].pos, Pos::Adv);
    }

    #[test]
    fn test_analyzer_is_object_safe() {
        let analyzer: Box<dyn TextAnalyzer> = Box::new(RuleAnalyzer::new().unwrap());
        assert!(analyzer.analyze("").is_empty());
    }
}
