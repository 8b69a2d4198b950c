//! # API Shared
//!
//! Wire types and small shared services for the DocsOS surfaces.
//!
//! Contains:
//! - Record views and request bodies (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `docsos-core`, `api-rest` and the CLI so that every surface speaks the same shapes.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
