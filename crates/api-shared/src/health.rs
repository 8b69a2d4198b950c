use crate::dto::HealthRes;

/// Simple health service shared by the REST API and the CLI.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Liveness only; store connectivity is reported by the status endpoint.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "DocsOS is alive".into(),
        }
    }
}
