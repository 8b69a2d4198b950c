//! Constants used throughout the DocsOS core crate.

/// Collection holding section records.
pub const SECTION_COLLECTION: &str = "section";

/// Collection holding doc records.
pub const DOC_COLLECTION: &str = "doc";

/// Default directory for uploaded assets when no explicit directory is configured.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default request body limit for uploads (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Client-facing message when a doc references an unknown section.
pub const SECTION_NOT_FOUND: &str = "Section not found";

/// Application name reported to the database server.
pub const APP_NAME: &str = "docsos";

/// Maximum number of collection names included in a status report.
pub const STATUS_MAX_COLLECTIONS: usize = 10;
