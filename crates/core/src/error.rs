use crate::store::StoreError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A foreign-key target does not exist.
    #[error("{0}")]
    Reference(String),
    #[error("invalid section_id filter: {0}")]
    InvalidFilter(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type DocsResult<T> = std::result::Result<T, DocsError>;
