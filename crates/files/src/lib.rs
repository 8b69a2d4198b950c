//! DocsOS upload storage
//!
//! Uploaded assets (mostly images embedded in docs) are stored as individual files directly
//! under one upload root and served back by exact filename.
//!
//! ## Naming
//!
//! A file keeps its client-supplied name unless that name is taken. Then the first free name
//! in the sequence `base_1.ext`, `base_2.ext`, … is used:
//!
//! ```text
//! uploads/
//! ├── diagram.png
//! ├── diagram_1.png
//! └── diagram_2.png
//! ```
//!
//! Every candidate is claimed with an exclusive create, so an existing file is never
//! overwritten, including when the same name is uploaded concurrently.
//!
//! ## Example Usage
//!
//! ```no_run
//! use docsos_files::UploadService;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = UploadService::new(Path::new("uploads"))?;
//! let stored = service.store("diagram.png", b"\x89PNG\r\n\x1a\n")?;
//! assert!(stored.url.starts_with("/static/"));
//! # Ok(())
//! # }
//! ```

mod constants;
mod uploads;

pub use constants::{MAX_NAME_ATTEMPTS, STATIC_URL_PREFIX};
pub use uploads::{candidate_name, sanitize_filename, static_url, StoredUpload, UploadService};

/// Errors that can occur during upload operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Upload root does not exist and cannot be created, or is not a directory
    #[error("Invalid upload directory: {0}")]
    InvalidRootDirectory(String),

    /// Requested filename is empty or names a directory
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Every probed name was already taken
    #[error("No free name for '{0}' after {1} attempts")]
    NamesExhausted(String, u32),

    #[error("File not found: {0}")]
    NotFound(String),

    /// Writing or reading the asset failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
