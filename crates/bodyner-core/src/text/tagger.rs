//! # Rule-based POS Tagger and Lemmatizer
//!
//! A small, deterministic tagger that assigns Universal POS tags and lemmas
//! using closed-class word lists and a handful of context rules. It is good
//! enough to drive the lexicon matcher on forum text and can be swapped for a
//! statistical engine through [`TextAnalyzer`](crate::text::TextAnalyzer).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::text::tokenizer::Token;

/// Universal part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl Pos {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::X => "X",
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pos {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pos = match s.to_ascii_uppercase().as_str() {
            "ADJ" => Pos::Adj,
            "ADP" => Pos::Adp,
            "ADV" => Pos::Adv,
            "AUX" => Pos::Aux,
            "CCONJ" => Pos::Cconj,
            "DET" => Pos::Det,
            "INTJ" => Pos::Intj,
            "NOUN" => Pos::Noun,
            "NUM" => Pos::Num,
            "PART" => Pos::Part,
            "PRON" => Pos::Pron,
            "PROPN" => Pos::Propn,
            "PUNCT" => Pos::Punct,
            "SCONJ" => Pos::Sconj,
            "SYM" => Pos::Sym,
            "VERB" => Pos::Verb,
            "X" => Pos::X,
            other => return Err(format!("unknown POS tag {other:?}")),
        };
        Ok(pos)
    }
}

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "my", "your", "his", "her", "its", "our",
    "their", "some", "any", "every", "each", "no", "both", "all", "either", "neither", "another",
];

// Subject pronouns trigger the verb rule; the rest are plain pronouns.
const SUBJECT_PRONOUNS: &[&str] = &["i", "you", "he", "she", "it", "we", "they"];

const PRONOUNS: &[&str] = &[
    "me", "him", "us", "them", "myself", "yourself", "himself", "herself", "itself", "ourselves",
    "themselves", "mine", "yours", "hers", "ours", "theirs", "something", "anything", "nothing",
    "everything", "someone", "anyone", "everyone", "who", "what", "which", "i'm", "i've", "i'd",
    "i'll", "it's", "you're", "they're", "we're",
];

const AUXILIARIES: &[&str] = &[
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "can", "could", "should", "may", "might", "must", "shall", "can't",
    "don't", "doesn't", "didn't", "won't", "isn't", "wasn't", "aren't", "couldn't", "shouldn't",
    "wouldn't",
];

const ADPOSITIONS: &[&str] = &[
    "in", "on", "at", "of", "with", "from", "for", "by", "about", "into", "onto", "over", "under",
    "after", "before", "through", "during", "between", "behind", "above", "below", "around",
    "across", "against", "along", "without", "within", "towards", "toward", "upon", "near",
];

const COORDINATORS: &[&str] = &["and", "or", "but", "nor", "yet"];

const SUBORDINATORS: &[&str] = &[
    "if", "because", "while", "although", "though", "since", "unless", "whereas", "when", "until",
    "than", "whether",
];

const PARTICLES: &[&str] = &["not", "to", "n't"];

const ADVERBS: &[&str] = &[
    "too", "very", "really", "also", "just", "so", "still", "even", "never", "always", "often",
    "again", "now", "then", "here", "there", "quite", "almost", "already", "sometimes", "maybe",
    "only", "much", "more", "most", "less", "well", "ever", "yesterday", "today", "tomorrow",
];

// Directional particles that follow a verb ("came back", "fell down").
const VERB_PARTICLES: &[&str] = &["back", "up", "down", "out", "off", "away", "over", "around"];

const INTERJECTIONS: &[&str] = &["oh", "ouch", "ow", "wow", "hey", "yes", "yeah", "no", "ugh", "lol"];

const ADJECTIVE_SUFFIXES: &[&str] = &["ful", "ous", "ive", "able", "ible", "less", "ish", "ical"];

const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("calves", "calf"),
    ("halves", "half"),
    ("knives", "knife"),
    ("lives", "life"),
    ("selves", "self"),
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("people", "person"),
    ("mice", "mouse"),
];

/// Assigns POS tags and lemmas to tokenizer output.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTagger;

impl RuleTagger {
    pub fn new() -> Self {
        Self
    }

    /// Tag tokens in place, left to right, so context rules can look at the
    /// previous token's tag.
    pub fn tag(&self, tokens: &mut [Token]) {
        let mut prev: Option<(Pos, String)> = None;

        for token in tokens.iter_mut() {
            let lower = token.text.to_lowercase();
            let pos = self.classify(&token.text, &lower, prev.as_ref());
            token.lemma = lemmatize(&lower, pos);
            token.pos = pos;
            prev = Some((pos, lower));
        }
    }

    fn classify(&self, raw: &str, lower: &str, prev: Option<&(Pos, String)>) -> Pos {
        if raw.chars().all(|c| !c.is_alphanumeric()) {
            return if raw.chars().all(|c| c.is_ascii_punctuation() || is_unicode_punct(c)) {
                Pos::Punct
            } else {
                Pos::Sym
            };
        }
        if raw.chars().all(|c| c.is_ascii_digit()) {
            return Pos::Num;
        }

        let word = lower;
        if DETERMINERS.contains(&word) {
            return Pos::Det;
        }
        if SUBJECT_PRONOUNS.contains(&word) || PRONOUNS.contains(&word) {
            return Pos::Pron;
        }
        if AUXILIARIES.contains(&word) {
            return Pos::Aux;
        }
        if COORDINATORS.contains(&word) {
            return Pos::Cconj;
        }
        if SUBORDINATORS.contains(&word) {
            return Pos::Sconj;
        }
        if PARTICLES.contains(&word) {
            return Pos::Part;
        }

        if let Some((prev_pos, prev_word)) = prev {
            match prev_pos {
                Pos::Verb if VERB_PARTICLES.contains(&word) => return Pos::Adv,
                Pos::Pron if SUBJECT_PRONOUNS.contains(&prev_word.as_str()) => return Pos::Verb,
                Pos::Aux => return Pos::Verb,
                Pos::Part if prev_word == "to" => return Pos::Verb,
                _ => {}
            }
        }

        if ADPOSITIONS.contains(&word) {
            return Pos::Adp;
        }
        if ADVERBS.contains(&word) {
            return Pos::Adv;
        }
        if INTERJECTIONS.contains(&word) {
            return Pos::Intj;
        }
        if word.len() > 4 && word.ends_with("ly") {
            return Pos::Adv;
        }
        if word.len() > 5 && ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return Pos::Adj;
        }

        Pos::Noun
    }
}

fn is_unicode_punct(c: char) -> bool {
    matches!(
        c,
        '—' | '–' | '…' | '‘' | '’' | '“' | '”' | '«' | '»' | '¿' | '¡'
    )
}

/// Reduce a lower-cased word to its base form.
pub fn lemmatize(lower: &str, pos: Pos) -> String {
    match pos {
        Pos::Noun => lemmatize_noun(lower),
        Pos::Verb => lemmatize_verb(lower),
        _ => lower.to_string(),
    }
}

fn lemmatize_noun(word: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR_NOUNS.iter().find(|(plural, _)| *plural == word) {
        return (*lemma).to_string();
    }
    if word.len() > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.len() > suffix.len() + 1 && word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    strip_plural_s(word)
}

fn lemmatize_verb(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    strip_plural_s(word)
}

fn strip_plural_s(word: &str) -> String {
    let keeps_s = word.ends_with("ss") || word.ends_with("us") || word.ends_with("is");
    if word.len() > 3 && word.ends_with('s') && !keeps_s {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenizer::Tokenizer;

    fn tag(text: &str) -> Vec<Token> {
        let mut tokens = Tokenizer::new().unwrap().tokenize(text);
        RuleTagger::new().tag(&mut tokens);
        tokens
    }

    fn pos_of(tokens: &[Token], text: &str) -> Pos {
        tokens.iter().find(|t| t.text == text).unwrap().pos
    }

    #[test]
    fn test_possessive_noun() {
        let tokens = tag("My knee hurts and my wrist too.");
        assert_eq!(pos_of(&tokens, "My"), Pos::Det);
        assert_eq!(pos_of(&tokens, "knee"), Pos::Noun);
        assert_eq!(pos_of(&tokens, "wrist"), Pos::Noun);
        assert_eq!(pos_of(&tokens, "and"), Pos::Cconj);
        assert_eq!(pos_of(&tokens, "too"), Pos::Adv);
        assert_eq!(pos_of(&tokens, "."), Pos::Punct);
    }

    #[test]
    fn test_verb_context() {
        let tokens = tag("I came back and then I will stretch");
        assert_eq!(pos_of(&tokens, "came"), Pos::Verb);
        assert_eq!(pos_of(&tokens, "back"), Pos::Adv);
        assert_eq!(pos_of(&tokens, "stretch"), Pos::Verb);
    }

    #[test]
    fn test_back_as_noun() {
        let tokens = tag("my back is sore");
        assert_eq!(pos_of(&tokens, "back"), Pos::Noun);
    }

    #[test]
    fn test_lemmas() {
        let tokens = tag("the feet and the knees and the noses and the ribs");
        let lemmas: Vec<_> = tokens
            .iter()
            .filter(|t| t.pos == Pos::Noun)
            .map(|t| t.lemma.as_str())
            .collect();
        assert_eq!(lemmas, vec!["foot", "knee", "nose", "rib"]);
    }

    #[test]
    fn test_noun_lemma_rules() {
        assert_eq!(lemmatize("teeth", Pos::Noun), "tooth");
        assert_eq!(lemmatize("calves", Pos::Noun), "calf");
        assert_eq!(lemmatize("injuries", Pos::Noun), "injury");
        assert_eq!(lemmatize("stretches", Pos::Noun), "stretch");
        assert_eq!(lemmatize("hips", Pos::Noun), "hip");
        assert_eq!(lemmatize("glass", Pos::Noun), "glass");
        assert_eq!(lemmatize("back", Pos::Noun), "back");
        assert_eq!(lemmatize("Knees", Pos::Adj), "Knees");
    }

    #[test]
    fn test_pos_display_roundtrip() {
        for pos in [Pos::Noun, Pos::Verb, Pos::Punct, Pos::X] {
            assert_eq!(pos.to_string().parse::<Pos>().unwrap(), pos);
        }
        assert!("NOPE".parse::<Pos>().is_err());
    }
}
