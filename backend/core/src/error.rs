use thiserror::Error;

/// Top-level error type for Hushwatch.
#[derive(Debug, Error)]
pub enum HushError {
    /// The persistence backend could not read or durably write group state.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// A caller supplied an argument outside the accepted range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HushError {
    /// Wrap any displayable backend error as a persistence failure.
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T, E = HushError> = std::result::Result<T, E>;
