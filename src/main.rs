use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use docsos_core::{open_store, CoreConfig};
use docsos_files::UploadService;

const DEFAULT_PORT: &str = "8000";

/// Main entry point for the DocsOS server
///
/// Resolves configuration from the environment, opens the document store, prepares the upload
/// directory and serves the REST API.
///
/// # Environment Variables
/// - `DATABASE_URL` / `DATABASE_NAME`: MongoDB connection (unset: in-memory store)
/// - `UPLOAD_DIR`: Upload root (default: "uploads")
/// - `DOCSOS_REST_ADDR`: REST server address (default: "0.0.0.0:$PORT")
/// - `PORT`: Listen port when `DOCSOS_REST_ADDR` is unset (default: 8000)
/// - `DOCSOS_MAX_UPLOAD_BYTES`: Upload body limit (default: 10 MiB)
/// - `DOCSOS_SECTION_FILTER`: `ignore` or `reject` malformed `section_id` filters
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docsos_run=info".parse()?)
                .add_directive("docsos_core=info".parse()?)
                .add_directive("docsos_files=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env().context("invalid configuration")?;
    let rest_addr = std::env::var("DOCSOS_REST_ADDR").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.into());
        format!("0.0.0.0:{}", port)
    });

    let store = open_store(&cfg).await?;
    let uploads = UploadService::new(cfg.upload_dir())
        .with_context(|| format!("preparing upload directory {}", cfg.upload_dir().display()))?;
    tracing::info!("++ Serving uploads from {}", uploads.root_directory().display());

    let app = api_rest::router(AppState::new(Arc::new(cfg), store, uploads));

    tracing::info!("++ Starting DocsOS REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr)
        .await
        .with_context(|| format!("binding {}", rest_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
