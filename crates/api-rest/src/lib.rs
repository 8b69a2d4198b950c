//! # API REST
//!
//! HTTP surface for DocsOS.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, multipart uploads, static files, CORS)
//!
//! Handlers only translate between HTTP and `docsos-core` / `docsos-files`; results are returned
//! as the core produced them.

#![warn(rust_2018_idioms)]

mod error;
mod routes;

pub use error::ApiError;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use docsos_core::{CoreConfig, DocRepository, DocumentStore, SectionRepository};
use docsos_files::{UploadService, STATIC_URL_PREFIX};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers
///
/// Holds the store handle opened at startup and the services built on it.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    store: Arc<dyn DocumentStore>,
    sections: SectionRepository,
    docs: DocRepository,
    uploads: Arc<UploadService>,
}

impl AppState {
    pub fn new(
        cfg: Arc<CoreConfig>,
        store: Arc<dyn DocumentStore>,
        uploads: UploadService,
    ) -> Self {
        Self {
            sections: SectionRepository::new(store.clone()),
            docs: DocRepository::new(store.clone(), cfg.section_filter_policy()),
            uploads: Arc::new(uploads),
            store,
            cfg,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DocsOS API",
        description = "Documentation backend: sections, docs and image uploads"
    ),
    paths(
        routes::root,
        routes::health,
        routes::schema_overview,
        routes::create_section,
        routes::list_sections,
        routes::create_doc,
        routes::list_docs,
        routes::upload_asset,
        routes::status,
    ),
    components(schemas(
        api_shared::Section,
        api_shared::Doc,
        api_shared::SectionInput,
        api_shared::DocInput,
        api_shared::CreatedRes,
        api_shared::UploadRes,
        api_shared::HealthRes,
        api_shared::RootRes,
        api_shared::StatusRes,
        api_shared::ErrorRes,
        api_shared::ValidationErrorRes,
        api_shared::FieldViolationRes,
        routes::UploadForm,
    ))
)]
pub struct ApiDoc;

/// Builds the full router: API routes, static uploads, Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    let upload_limit = state.cfg.max_upload_bytes();
    let static_files = ServeDir::new(state.uploads.root_directory());

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/schema", get(routes::schema_overview))
        .route(
            "/sections",
            get(routes::list_sections).post(routes::create_section),
        )
        .route("/docs", get(routes::list_docs).post(routes::create_doc))
        .route(
            "/upload",
            post(routes::upload_asset).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/test", get(routes::status))
        .nest_service(STATIC_URL_PREFIX, static_files)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
