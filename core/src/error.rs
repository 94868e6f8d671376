use thiserror::Error;

/// Errors raised while building, persisting, loading or querying an index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("corrupt metadata: {0}")]
    CorruptMetadata(String),

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error("invalid postings list: {0}")]
    InvalidPostings(String),

    #[error("normalization failed for document {key}: {reason}")]
    Normalization { key: String, reason: String },

    #[error("duplicate document key: {0}")]
    DuplicateDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    pub(crate) fn corrupt_index(msg: impl Into<String>) -> Self {
        IndexError::CorruptIndex(msg.into())
    }

    pub(crate) fn corrupt_metadata(msg: impl Into<String>) -> Self {
        IndexError::CorruptMetadata(msg.into())
    }

    /// Whether the builder can skip the offending document and keep going.
    pub fn is_per_document(&self) -> bool {
        matches!(self, IndexError::Normalization { .. } | IndexError::DuplicateDocument(_))
    }
}
