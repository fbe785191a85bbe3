//! # Tokenizer
//!
//! Splits informal text into word and punctuation tokens with character
//! offsets. Offsets count Unicode scalar values, the same unit the
//! annotation tool uses for its `start`/`end` fields.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::text::tagger::Pos;

/// A token with its position, part of speech and lemma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token text as it appears in the source
    pub text: String,
    /// Start character offset in the source text (inclusive)
    pub start: usize,
    /// End character offset in the source text (exclusive)
    pub end: usize,
    /// Token index in the sequence
    pub index: usize,
    /// Universal part-of-speech tag
    pub pos: Pos,
    /// Normalized base form
    pub lemma: String,
}

impl Token {
    /// Create an untagged token. The lemma defaults to the lower-cased text.
    pub fn new(text: impl Into<String>, start: usize, end: usize, index: usize) -> Self {
        let text = text.into();
        let lemma = text.to_lowercase();
        Self {
            text,
            start,
            end,
            index,
            pos: Pos::X,
            lemma,
        }
    }

    /// Builder-style setter for the part of speech and lemma.
    pub fn tagged(mut self, pos: Pos, lemma: impl Into<String>) -> Self {
        self.pos = pos;
        self.lemma = lemma.into();
        self
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Words (letters/digits with internal apostrophes) or single symbols.
const TOKEN_PATTERN: &str = r"[\p{L}\p{N}_]+(?:['’][\p{L}\p{N}_]+)*|[^\s\p{L}\p{N}_]";

/// Regex-driven tokenizer for forum text.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    re_token: Regex,
}

impl Tokenizer {
    /// Create a new tokenizer instance.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Regex` if the token pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_token: Regex::new(TOKEN_PATTERN)?,
        })
    }

    /// Tokenize a text into a sequence of untagged tokens.
    ///
    /// # Examples
    /// ```
    /// use bodyner_core::text::Tokenizer;
    ///
    /// let tokenizer = Tokenizer::new().unwrap();
    /// let tokens = tokenizer.tokenize("My knee hurts.");
    /// assert_eq!(tokens.len(), 4);
    /// assert_eq!((tokens[1].start, tokens[1].end), (3, 7));
    /// ```
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        // Byte offsets from the regex are converted to char offsets incrementally.
        let mut byte_cursor = 0;
        let mut char_cursor = 0;

        for m in self.re_token.find_iter(input) {
            char_cursor += input[byte_cursor..m.start()].chars().count();
            let start = char_cursor;
            let len = m.as_str().chars().count();
            char_cursor += len;
            byte_cursor = m.end();

            tokens.push(Token::new(m.as_str(), start, start + len, tokens.len()));
        }

        tokens
    }
}

/// Slice `text` by character offsets. Out-of-range offsets are clamped.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |char_idx: usize| {
        text.char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(text.len())
    };
    let start_byte = byte_at(start);
    let end_byte = byte_at(end.max(start));
    &text[start_byte..end_byte]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_basic() {
        let tokenizer = Tokenizer::new().unwrap();
        let tokens = tokenizer.tokenize("My knee hurts and my wrist too.");

        assert_eq!(
            texts(&tokens),
            vec!["My", "knee", "hurts", "and", "my", "wrist", "too", "."]
        );
        assert_eq!((tokens[1].start, tokens[1].end), (3, 7));
        assert_eq!((tokens[5].start, tokens[5].end), (21, 26));
        assert_eq!(tokens[7].index, 7);
    }

    #[test]
    fn test_tokenize_apostrophes() {
        let tokenizer = Tokenizer::new().unwrap();
        let tokens = tokenizer.tokenize("I can't feel my toes!!");
        assert_eq!(texts(&tokens), vec!["I", "can't", "feel", "my", "toes", "!", "!"]);
    }

    #[test]
    fn test_tokenize_multibyte_offsets() {
        let tokenizer = Tokenizer::new().unwrap();
        let text = "Ça fait mal — knee";
        let tokens = tokenizer.tokenize(text);

        let knee = tokens.last().unwrap();
        assert_eq!(knee.text, "knee");
        assert_eq!(char_slice(text, knee.start, knee.end), "knee");
        assert_eq!(knee.start, 14);
    }

    #[test]
    fn test_tokenize_empty() {
        let tokenizer = Tokenizer::new().unwrap();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn test_char_slice_clamps() {
        assert_eq!(char_slice("knee", 1, 99), "nee");
        assert_eq!(char_slice("knee", 9, 12), "");
        assert_eq!(char_slice("knee", 3, 1), "");
    }
}
