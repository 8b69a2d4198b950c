//! REST handlers.

use crate::{ApiDoc, ApiError, AppState};
use api_shared::{
    CreatedRes, Doc, DocInput, ErrorRes, HealthRes, HealthService, RootRes, Section, SectionInput,
    StatusRes, UploadRes, ValidationErrorRes,
};
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use docsos_core::status_report;
use docsos_files::StoredUpload;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::{IntoParams, OpenApi, ToSchema};

/// Query parameters of `GET /docs`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct DocsQuery {
    /// Only return docs of this section
    section_id: Option<String>,
}

/// Multipart body of `POST /upload`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

fn upload_response(stored: StoredUpload) -> UploadRes {
    UploadRes {
        url: stored.url,
        filename: stored.filename.into_inner(),
        size_bytes: stored.size_bytes,
        media_type: stored.media_type,
        sha256: stored.sha256,
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "API banner", body = RootRes))
)]
pub(crate) async fn root() -> Json<RootRes> {
    Json(RootRes {
        message: "DocsOS API running".into(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthRes))
)]
#[axum::debug_handler]
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

/// JSON schemas of the section and doc request bodies.
#[utoipa::path(
    get,
    path = "/schema",
    responses((status = 200, description = "Schemas of the create bodies"))
)]
pub(crate) async fn schema_overview() -> Json<Value> {
    let schemas = ApiDoc::openapi()
        .components
        .map(|c| c.schemas)
        .unwrap_or_default();
    Json(json!({
        "section": schemas.get("SectionInput"),
        "doc": schemas.get("DocInput"),
    }))
}

#[utoipa::path(
    post,
    path = "/sections",
    request_body = SectionInput,
    responses(
        (status = 200, description = "Section created", body = CreatedRes),
        (status = 422, description = "Invalid payload", body = ValidationErrorRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn create_section(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<CreatedRes>, ApiError> {
    let id = state.sections.create(&payload).await?;
    Ok(Json(CreatedRes { id: id.to_string() }))
}

#[utoipa::path(
    get,
    path = "/sections",
    responses(
        (status = 200, description = "Sections ordered by `order`", body = [Section]),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_sections(
    State(state): State<AppState>,
) -> Result<Json<Vec<Section>>, ApiError> {
    Ok(Json(state.sections.list().await?))
}

#[utoipa::path(
    post,
    path = "/docs",
    request_body = DocInput,
    responses(
        (status = 200, description = "Doc created", body = CreatedRes),
        (status = 400, description = "Section does not exist", body = ErrorRes),
        (status = 422, description = "Invalid payload", body = ValidationErrorRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn create_doc(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<CreatedRes>, ApiError> {
    let id = state.docs.create(&payload).await?;
    Ok(Json(CreatedRes { id: id.to_string() }))
}

#[utoipa::path(
    get,
    path = "/docs",
    params(DocsQuery),
    responses(
        (status = 200, description = "Docs, optionally of one section", body = [Doc]),
        (status = 400, description = "Malformed section filter", body = ErrorRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_docs(
    State(state): State<AppState>,
    Query(query): Query<DocsQuery>,
) -> Result<Json<Vec<Doc>>, ApiError> {
    Ok(Json(state.docs.list(query.section_id.as_deref()).await?))
}

/// Stores the multipart field `file` under the upload root.
///
/// The name is the client's filename unless taken, in which case a `_N` suffix is added
/// before the extension.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Asset stored", body = UploadRes),
        (status = 400, description = "Missing file field or unusable filename", body = ErrorRes),
        (status = 413, description = "Upload too large", body = ErrorRes),
        (status = 500, description = "Filesystem failure", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn upload_asset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadRes>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| ApiError::bad_request("field 'file' has no filename"))?;
        let content = field.bytes().await?;

        let uploads = state.uploads.clone();
        let stored = tokio::task::spawn_blocking(move || uploads.store(&filename, &content))
            .await
            .map_err(|e| {
                tracing::error!("Upload task failed: {}", e);
                ApiError::internal("upload task failed")
            })??;
        return Ok(Json(upload_response(stored)));
    }
    Err(ApiError::bad_request("missing multipart field 'file'"))
}

/// Reports store connectivity. Always answers `200`; problems are described in the body.
#[utoipa::path(
    get,
    path = "/test",
    responses((status = 200, description = "Store connectivity report", body = StatusRes))
)]
#[axum::debug_handler]
pub(crate) async fn status(State(state): State<AppState>) -> Json<StatusRes> {
    Json(status_report(&state.cfg, state.store.as_ref()).await)
}
