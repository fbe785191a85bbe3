use thiserror::Error;

/// Errors that can occur during bodyner core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The annotation archive could not be opened.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The annotation archive does not contain the expected entry.
    #[error("archive has no entry named {name:?}")]
    MissingArchiveEntry {
        /// Entry that was looked up.
        name: String,
    },

    /// The raw text corpus does not have the expected shape.
    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),

    /// The label configuration is incomplete.
    #[error("invalid label config: {0}")]
    InvalidConfig(String),

    /// A task does not carry text under the configured input key.
    #[error("task data has no text under key {key:?}")]
    MissingInputKey {
        /// The configured input key.
        key: String,
    },

    /// The training percentage is outside `0..=100`.
    #[error("train percentage must be within 0..=100, got {0}")]
    InvalidSplit(u32),

    /// A BILOU tag sequence does not describe well-formed entities.
    #[error("invalid tag sequence at token {index}: {reason}")]
    InvalidTagSequence {
        /// Token position where the sequence broke.
        index: usize,
        /// What was wrong.
        reason: String,
    },

    /// Tokens and tags disagree in length.
    #[error("{tokens} tokens but {tags} tags")]
    LengthMismatch {
        /// Number of tokens.
        tokens: usize,
        /// Number of tags.
        tags: usize,
    },

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for bodyner operations.
pub type Result<T> = std::result::Result<T, CoreError>;
