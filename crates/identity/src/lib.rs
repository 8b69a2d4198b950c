//! Record identity codec.
//!
//! DocsOS records are keyed by the document store's native identity: a 12-byte ObjectId.
//! At the API boundary the same identity travels as text.
//!
//! ## Canonical text form
//! - Length: 24
//! - Characters: `0-9` and `a-f` when produced by this crate
//! - Example: `65f1c2a9e4b0d3a1f2c3d4e5`
//!
//! Parsing accepts exactly what the store's own ObjectId parser accepts (24 hex digits in either
//! case). Anything else is rejected with [`IdentityError::InvalidInput`] so that malformed text
//! never reaches the store as a lookup key.

mod record_id;

pub use bson::oid::ObjectId;
pub use record_id::RecordId;

/// Error type for identity operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Invalid input provided
    #[error("Invalid identity: {0}")]
    InvalidInput(String),
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;
