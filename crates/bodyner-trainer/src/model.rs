//! Structured perceptron for BILOU sequence labeling.
//! Sparse string features per token, a dense tag-transition matrix and
//! Viterbi decoding restricted to well-formed BILOU sequences.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use bodyner_core::predict::Recognizer;
use bodyner_core::tagging::spans_from_tags;
use bodyner_core::{BilouTag, EntitySpan, Lexicon, Result, TagKind, Token};
use oorandom::Rand64;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The tags a model can emit: `O` plus `B/I/L/U` for every label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<BilouTag>,
}

impl TagSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags = vec![BilouTag::Outside];
        for label in labels {
            let label = label.into();
            for kind in [TagKind::Begin, TagKind::Inside, TagKind::Last, TagKind::Unit] {
                tags.push(BilouTag::from_kind(kind, &label));
            }
        }
        Self { tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BilouTag> {
        self.tags.get(index)
    }

    /// Index of `tag`; `None` for `Missing` and unknown labels.
    pub fn index_of(&self, tag: &BilouTag) -> Option<usize> {
        self.tags.iter().position(|t| t == tag)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BilouTag> {
        self.tags.iter()
    }
}

/// On-disk form of a [`PerceptronTagger`].
#[derive(Serialize, Deserialize)]
struct ModelFile {
    labels: Vec<String>,
    lexicon: Vec<String>,
    weights: BTreeMap<String, Vec<f32>>,
    transition: Vec<f32>,
}

/// Averaging is not used; weights are the last perceptron state.
#[derive(Debug, Clone)]
pub struct PerceptronTagger {
    labels: Vec<String>,
    tagset: TagSet,
    lexicon: Arc<Lexicon>,
    /// Feature → one weight per tag
    weights: HashMap<String, Vec<f32>>,
    /// `transition[to * n + from]`
    transition: Vec<f32>,
}

impl PerceptronTagger {
    pub fn new(labels: Vec<String>, lexicon: Arc<Lexicon>) -> Self {
        let tagset = TagSet::new(labels.iter().cloned());
        let n = tagset.len();
        Self {
            labels,
            tagset,
            lexicon,
            weights: HashMap::new(),
            transition: vec![0.0; n * n],
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn tagset(&self) -> &TagSet {
        &self.tagset
    }

    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    fn extract_features(&self, tokens: &[Token], i: usize) -> Vec<String> {
        let token = &tokens[i];
        let lower = token.text.to_lowercase();
        let suffix: String = {
            let chars: Vec<char> = lower.chars().collect();
            chars[chars.len().saturating_sub(3)..].iter().collect()
        };

        let mut features = vec![
            "bias".to_string(),
            format!("w={lower}"),
            format!("lemma={}", token.lemma),
            format!("pos={}", token.pos),
            format!("suf={suffix}"),
            format!("shape={}", shape(&token.text)),
        ];
        if self.lexicon.contains(&token.lemma) {
            features.push("lex".to_string());
            features.push(format!("lex+pos={}", token.pos));
        }

        match i.checked_sub(1).and_then(|p| tokens.get(p)) {
            Some(prev) => {
                features.push(format!("-1:lemma={}", prev.lemma));
                features.push(format!("-1:pos={}", prev.pos));
            }
            None => features.push("BOS".to_string()),
        }
        match tokens.get(i + 1) {
            Some(next) => {
                features.push(format!("+1:lemma={}", next.lemma));
                features.push(format!("+1:pos={}", next.pos));
            }
            None => features.push("EOS".to_string()),
        }

        features
    }

    fn score(&self, features: &[String]) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.tagset.len()];
        for feature in features {
            if let Some(weights) = self.weights.get(feature) {
                for (score, w) in scores.iter_mut().zip(weights) {
                    *score += w;
                }
            }
        }
        scores
    }

    /// Emission scores, `[seq_len][num_tags]`.
    pub fn emissions(&self, tokens: &[Token]) -> Vec<Vec<f32>> {
        (0..tokens.len())
            .map(|i| self.score(&self.extract_features(tokens, i)))
            .collect()
    }

    fn decode(&self, tokens: &[Token]) -> Vec<usize> {
        viterbi_decode(&self.emissions(tokens), &self.transition, &self.tagset)
    }

    /// Best well-formed tag sequence for `tokens`.
    pub fn predict_tags(&self, tokens: &[Token]) -> Vec<BilouTag> {
        self.decode(tokens)
            .into_iter()
            .map(|i| self.tagset.get(i).cloned().unwrap_or(BilouTag::Outside))
            .collect()
    }

    /// One perceptron update against `gold`. Positions tagged `Missing` (or
    /// with labels outside the tag set) are neither scored nor updated.
    /// Each feature is skipped with probability `dropout`.
    ///
    /// Returns the number of scored positions and how many were wrong.
    pub fn update(
        &mut self,
        tokens: &[Token],
        gold: &[BilouTag],
        learning_rate: f32,
        dropout: f64,
        rng: &mut Rand64,
    ) -> (usize, usize) {
        let n = self.tagset.len();
        let predicted = self.decode(tokens);
        let gold: Vec<Option<usize>> = gold.iter().map(|t| self.tagset.index_of(t)).collect();

        let mut scored = 0;
        let mut errors = 0;

        for (i, (&pred, truth)) in predicted.iter().zip(&gold).enumerate() {
            let Some(truth) = *truth else { continue };
            scored += 1;
            if pred == truth {
                continue;
            }
            errors += 1;

            for feature in self.extract_features(tokens, i) {
                if dropout > 0.0 && rng.rand_float() < dropout {
                    continue;
                }
                let weights = self.weights.entry(feature).or_insert_with(|| vec![0.0; n]);
                weights[truth] += learning_rate;
                weights[pred] -= learning_rate;
            }
        }

        for i in 1..predicted.len().min(gold.len()) {
            let (Some(from), Some(to)) = (gold[i - 1], gold[i]) else {
                continue;
            };
            let (pred_from, pred_to) = (predicted[i - 1], predicted[i]);
            if (pred_from, pred_to) != (from, to) {
                self.transition[to * n + from] += learning_rate;
                self.transition[pred_to * n + pred_from] -= learning_rate;
            }
        }

        (scored, errors)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = ModelFile {
            labels: self.labels.clone(),
            lexicon: self.lexicon.iter().map(str::to_string).collect(),
            weights: self
                .weights
                .iter()
                .filter(|(_, w)| w.iter().any(|x| *x != 0.0))
                .map(|(f, w)| (f.clone(), w.clone()))
                .collect(),
            transition: self.transition.clone(),
        };
        fs::write(path, serde_json::to_string(&file)?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file: ModelFile = serde_json::from_slice(&fs::read(path)?)?;
        let mut model = Self::new(file.labels, Arc::new(Lexicon::new(file.lexicon)));
        let n = model.tagset.len();
        if file.transition.len() != n * n || file.weights.values().any(|w| w.len() != n) {
            return Err(bodyner_core::CoreError::InvalidConfig(format!(
                "model weights do not match its {n} tags"
            )));
        }
        model.weights = file.weights.into_iter().collect();
        model.transition = file.transition;
        Ok(model)
    }
}

impl Recognizer for PerceptronTagger {
    fn recognize(&self, tokens: &[Token]) -> Vec<EntitySpan> {
        let tags = self.predict_tags(tokens);
        spans_from_tags(tokens, &tags).unwrap_or_else(|err| {
            warn!(error = %err, "decoded an ill-formed tag sequence");
            Vec::new()
        })
    }
}

/// Coarse word shape: `Xxxx`, `xxx`, `dd`, with runs collapsed after four.
fn shape(text: &str) -> String {
    let mut out = String::new();
    let mut last = None;
    let mut run = 0;
    for c in text.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() {
            'x'
        } else if c.is_numeric() {
            'd'
        } else {
            c
        };
        if Some(class) == last {
            run += 1;
        } else {
            run = 1;
            last = Some(class);
        }
        if run <= 4 {
            out.push(class);
        }
    }
    out
}

/// Viterbi over `emissions` (`[seq_len][num_tags]`) and a flat
/// `transitions[to * n + from]` matrix. Only transitions allowed by
/// [`BilouTag::is_valid_transition`] are considered; the first tag must be
/// able to start a sequence and the last must be able to end one.
pub fn viterbi_decode(emissions: &[Vec<f32>], transitions: &[f32], tagset: &TagSet) -> Vec<usize> {
    let n = tagset.len();
    let seq_len = emissions.len();
    if seq_len == 0 || n == 0 {
        return Vec::new();
    }

    let tags: Vec<&BilouTag> = tagset.iter().collect();
    let mut valid = vec![false; n * n];
    for (from, from_tag) in tags.iter().enumerate() {
        for (to, to_tag) in tags.iter().enumerate() {
            valid[to * n + from] = BilouTag::is_valid_transition(from_tag, to_tag);
        }
    }

    let mut dp = vec![vec![f32::NEG_INFINITY; n]; seq_len];
    let mut backptr = vec![vec![0usize; n]; seq_len];

    for tag in 0..n {
        if tags[tag].can_start() {
            dp[0][tag] = emissions[0][tag];
        }
    }

    for pos in 1..seq_len {
        for curr in 0..n {
            let mut best_score = f32::NEG_INFINITY;
            let mut best_prev = 0;

            for prev in 0..n {
                if !valid[curr * n + prev] || dp[pos - 1][prev] == f32::NEG_INFINITY {
                    continue;
                }
                let score = dp[pos - 1][prev] + transitions[curr * n + prev];
                if score > best_score {
                    best_score = score;
                    best_prev = prev;
                }
            }

            if best_score > f32::NEG_INFINITY {
                dp[pos][curr] = best_score + emissions[pos][curr];
                backptr[pos][curr] = best_prev;
            }
        }
    }

    // `O` (index 0) is always a legal final tag, so a path exists.
    let mut best_final = 0;
    let mut best_final_score = f32::NEG_INFINITY;
    for tag in 0..n {
        let score = dp[seq_len - 1][tag];
        if tags[tag].can_end() && score > best_final_score {
            best_final_score = score;
            best_final = tag;
        }
    }

    let mut path = vec![0usize; seq_len];
    path[seq_len - 1] = best_final;
    for pos in (1..seq_len).rev() {
        path[pos - 1] = backptr[pos][path[pos]];
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodyner_core::{RuleAnalyzer, TextAnalyzer, BODY_PART};

    fn tagset() -> TagSet {
        TagSet::new([BODY_PART])
    }

    fn tag(s: &str) -> BilouTag {
        s.parse().unwrap()
    }

    #[test]
    fn test_tagset_layout() {
        let set = tagset();
        assert_eq!(set.len(), 5);
        assert_eq!(set.get(0), Some(&BilouTag::Outside));
        assert_eq!(set.index_of(&tag("U-BODY_PART")), Some(4));
        assert_eq!(set.index_of(&BilouTag::Missing), None);
        assert_eq!(set.index_of(&tag("U-OTHER")), None);
    }

    #[test]
    fn test_viterbi_respects_constraints() {
        let set = tagset();
        // Emissions strongly prefer a lone `I` then `B`, both illegal here.
        let emissions = vec![
            vec![0.0, 0.0, 5.0, 0.0, 0.0],
            vec![0.0, 5.0, 0.0, 0.0, 0.0],
        ];
        let path = viterbi_decode(&emissions, &[0.0; 25], &set);
        let tags: Vec<&BilouTag> = path.iter().map(|&i| set.get(i).unwrap()).collect();

        assert!(tags[0].can_start());
        assert!(tags[1].can_end());
        for pair in tags.windows(2) {
            assert!(BilouTag::is_valid_transition(pair[0], pair[1]));
        }
    }

    #[test]
    fn test_viterbi_picks_multi_token_entity() {
        let set = tagset();
        let emissions = vec![
            vec![0.0, 3.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 0.0, 3.0, 1.0],
            vec![2.0, 0.0, 0.0, 0.0, 0.0],
        ];
        let path = viterbi_decode(&emissions, &[0.0; 25], &set);
        assert_eq!(path, vec![1, 3, 0]);
    }

    #[test]
    fn test_viterbi_empty() {
        assert!(viterbi_decode(&[], &[], &tagset()).is_empty());
    }

    #[test]
    fn test_perceptron_learns_simple_pattern() {
        let analyzer = RuleAnalyzer::new().unwrap();
        let mut model =
            PerceptronTagger::new(vec![BODY_PART.to_string()], Arc::new(Lexicon::body_parts()));
        let tokens = analyzer.analyze("my knee hurts");
        let gold = vec![tag("O"), tag("U-BODY_PART"), tag("O")];
        let mut rng = Rand64::new(27);

        for _ in 0..5 {
            model.update(&tokens, &gold, 1.0, 0.0, &mut rng);
        }

        assert_eq!(model.predict_tags(&tokens), gold);
        assert_eq!(model.recognize(&tokens), vec![EntitySpan::new(3, 7, BODY_PART)]);
    }

    #[test]
    fn test_missing_positions_are_skipped() {
        let analyzer = RuleAnalyzer::new().unwrap();
        let mut model =
            PerceptronTagger::new(vec![BODY_PART.to_string()], Arc::new(Lexicon::body_parts()));
        let tokens = analyzer.analyze("my knee hurts");
        let gold = vec![BilouTag::Missing; 3];

        let (scored, errors) = model.update(&tokens, &gold, 1.0, 0.0, &mut Rand64::new(1));
        assert_eq!((scored, errors), (0, 0));
        assert_eq!(model.feature_count(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let analyzer = RuleAnalyzer::new().unwrap();
        let mut model =
            PerceptronTagger::new(vec![BODY_PART.to_string()], Arc::new(Lexicon::body_parts()));
        let tokens = analyzer.analyze("sore wrist");
        let gold = vec![tag("O"), tag("U-BODY_PART")];
        model.update(&tokens, &gold, 1.0, 0.0, &mut Rand64::new(1));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        model.save(&path).unwrap();
        let loaded = PerceptronTagger::load(&path).unwrap();

        assert_eq!(loaded.labels(), model.labels());
        assert_eq!(loaded.predict_tags(&tokens), model.predict_tags(&tokens));
    }

    #[test]
    fn test_shape() {
        assert_eq!(shape("Knee"), "Xxxx");
        assert_eq!(shape("shoulders"), "xxxx");
        assert_eq!(shape("L5"), "Xd");
    }
}
