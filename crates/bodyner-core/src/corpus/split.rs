//! # Train/Dev Splitter
//!
//! Seeded Fisher-Yates shuffle followed by a cut at
//! `round(len * train_pct / 100)`. The same `(corpus, train_pct, seed)`
//! always produces the same partition.

use oorandom::Rand64;
use tracing::info;

use crate::corpus::document::Corpus;
use crate::error::{CoreError, Result};

/// A disjoint partition of a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub train: Corpus,
    pub dev: Corpus,
}

/// Number of training documents for `len` documents at `train_pct` percent.
///
/// Rounds half to even, so 5 documents at 50% gives 2.
pub fn train_size(len: usize, train_pct: u32) -> usize {
    let scaled = len * train_pct as usize;
    let quotient = scaled / 100;
    let remainder = scaled % 100;
    if remainder > 50 || (remainder == 50 && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Shuffle and partition `corpus`.
///
/// # Errors
///
/// Returns `CoreError::InvalidSplit` if `train_pct` exceeds 100.
pub fn split(corpus: Corpus, train_pct: u32, seed: u64) -> Result<Split> {
    if train_pct > 100 {
        return Err(CoreError::InvalidSplit(train_pct));
    }

    let mut docs = corpus.into_docs();
    let mut rng = Rand64::new(u128::from(seed));
    for i in (1..docs.len()).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        docs.swap(i, j);
    }

    let cut = train_size(docs.len(), train_pct);
    let dev_docs = docs.split_off(cut);
    let split = Split {
        train: Corpus::new(docs),
        dev: Corpus::new(dev_docs),
    };

    info!("{} training entities", split.train.entity_count());
    info!("{} dev entities", split.dev.entity_count());

    Ok(split)
}
