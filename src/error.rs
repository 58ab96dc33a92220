use crate::language::Language;

/// Errors raised by the typing session itself
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `finalize` was called before the session reached `Finished`
    #[error("session has not finished yet")]
    NotFinished,
}

/// Errors raised while fetching the words for a session
#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    #[error("word request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed word list: {0}")]
    Malformed(String),

    #[error("no usable words for {0}")]
    Empty(Language),

    #[error("no word list bundled for {0}")]
    UnknownLanguage(String),
}

/// Errors raised while appending to or reading the score log
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// A failed supply leaves nothing to type, which `start` reports as invalid input.
impl From<SupplyError> for SessionError {
    fn from(err: SupplyError) -> Self {
        SessionError::InvalidInput(err.to_string())
    }
}
