//! # DocsOS Core
//!
//! Data access for the DocsOS documentation backend.
//!
//! This crate contains the pure data operations:
//! - Schema validation of Section and Doc payloads ([`validation`])
//! - A document store gateway with MongoDB and in-memory backends ([`store`])
//! - Typed repositories for sections and docs ([`repositories`])
//! - Store connectivity reporting ([`status`])
//!
//! **No API concerns**: HTTP routing, CORS, multipart handling and static file serving belong in
//! `api-rest`. Uploaded binary assets are handled by `docsos-files`.

pub mod config;
pub mod constants;
pub mod error;
pub mod repositories;
pub mod status;
pub mod store;
pub mod validation;

pub use config::{CoreConfig, DatabaseConfig, SectionFilterPolicy};
pub use constants::*;
pub use docsos_identity::{IdentityError, ObjectId, RecordId};
pub use docsos_types::NonEmptyText;
pub use error::{DocsError, DocsResult};
pub use repositories::{docs::DocRepository, sections::SectionRepository};
pub use status::status_report;
pub use store::{
    open_store, Collection, DocumentStore, FindOptions, MemoryStore, MongoStore, StoreError,
    StoreStatus,
};
pub use validation::{FieldViolation, NewDoc, NewSection, ValidationError};
