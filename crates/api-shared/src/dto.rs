//! Request and response shapes.
//!
//! Identities are always text here. Optional fields serialise as `null` rather than being
//! omitted, so clients see the full record shape.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A documentation section as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Section {
    /// Store-generated identity (24 hex characters)
    pub id: String,
    /// Section title, e.g. "Gestión de Procesos"
    pub title: String,
    /// Short description of the section
    pub description: Option<String>,
    /// Optional sort order; sections are listed ascending, absent counts as 0
    pub order: Option<i64>,
}

/// A markdown documentation entry nested under a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Doc {
    /// Store-generated identity (24 hex characters)
    pub id: String,
    /// Identity of the parent section
    pub section_id: String,
    pub title: String,
    /// Markdown content of the document
    pub content: String,
    /// Tags for filtering/search
    pub tags: Option<Vec<String>>,
    /// Optional cover image URL
    pub cover_image: Option<String>,
}

/// Body of `POST /sections`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SectionInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(minimum = 0)]
    pub order: Option<i64>,
}

/// Body of `POST /docs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DocInput {
    /// Identity of an existing section
    pub section_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Response of the create operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedRes {
    pub id: String,
}

/// Response of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadRes {
    /// Relative URL the asset is served from, e.g. `/static/diagram_1.png`
    pub url: String,
    /// Filename the asset was stored under
    pub filename: String,
    pub size_bytes: u64,
    /// Best-effort detected media type
    pub media_type: Option<String>,
    /// SHA-256 of the stored bytes, lowercase hex
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RootRes {
    pub message: String,
}

/// Store connectivity summary returned by `GET /test`.
///
/// Problems are reported inline in `database`; producing this never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusRes {
    pub backend: String,
    /// Store backend in use (`mongodb` or `memory`)
    pub store: String,
    pub database: String,
    /// Whether `DATABASE_URL` was configured
    pub database_url: String,
    /// Whether `DATABASE_NAME` was configured
    pub database_name: String,
    pub connection_status: String,
    /// Up to ten collection names
    pub collections: Vec<String>,
}

/// One violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldViolationRes {
    pub field: String,
    pub message: String,
}

/// Error body for client and internal errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

/// Error body for validation failures; lists every violated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorRes {
    pub detail: Vec<FieldViolationRes>,
}
