//! Gold corpus: documents, deterministic splitting and the training-file format.

pub mod document;
pub mod format;
pub mod split;

pub use document::{Corpus, GoldDocument};
pub use format::{corpus_from_training_json, to_training_json};
pub use split::{Split, split, train_size};
