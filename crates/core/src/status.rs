//! Store connectivity report for the status endpoint.

use crate::config::CoreConfig;
use crate::store::DocumentStore;
use api_shared::StatusRes;

const ERROR_PREVIEW_CHARS: usize = 50;

/// Builds the status report. Never fails: store problems are reported inline.
pub async fn status_report(cfg: &CoreConfig, store: &dyn DocumentStore) -> StatusRes {
    let status = store.status().await;
    let presence = |set: bool| if set { "set" } else { "not set" };

    let database = match (&status.error, status.connected) {
        (Some(err), _) => {
            let preview: String = err.chars().take(ERROR_PREVIEW_CHARS).collect();
            format!("error: {}", preview)
        }
        (None, true) => "connected & working".to_string(),
        (None, false) => "not available".to_string(),
    };

    StatusRes {
        backend: "running".into(),
        store: status.backend.into(),
        database,
        database_url: presence(cfg.database_url_set()).into(),
        database_name: presence(cfg.database_name_set()).into(),
        connection_status: if status.connected {
            "Connected".into()
        } else {
            "Not Connected".into()
        },
        collections: status.collections,
    }
}
