//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Request
//! handling never reads process-wide environment variables. The `*_from_env_value(s)` helpers
//! take already-read values so they can be tested without touching the environment.

use crate::constants::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOAD_DIR};
use crate::{DocsError, DocsResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How `list_docs` treats a `section_id` filter that is not a well-formed identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SectionFilterPolicy {
    /// Drop the filter and return every doc.
    #[default]
    Ignore,
    /// Report the malformed filter as a client error.
    Reject,
}

impl FromStr for SectionFilterPolicy {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(DocsError::InvalidConfig(format!(
                "section filter policy must be 'ignore' or 'reject', got '{}'",
                other
            ))),
        }
    }
}

/// Connection settings for the MongoDB backend.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    url: String,
    name: String,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> DocsResult<Self> {
        let url = url.into();
        let name = name.into();

        if url.trim().is_empty() {
            return Err(DocsError::InvalidConfig(
                "database url cannot be empty".into(),
            ));
        }
        if name.trim().is_empty() {
            return Err(DocsError::InvalidConfig(
                "database name cannot be empty".into(),
            ));
        }

        Ok(Self { url, name })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// The URL may embed credentials.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    upload_dir: PathBuf,
    database: Option<DatabaseConfig>,
    section_filter_policy: SectionFilterPolicy,
    max_upload_bytes: usize,
    database_url_set: bool,
    database_name_set: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `database = None` selects the in-memory store.
    pub fn new(
        upload_dir: PathBuf,
        database: Option<DatabaseConfig>,
        section_filter_policy: SectionFilterPolicy,
        max_upload_bytes: usize,
    ) -> DocsResult<Self> {
        if upload_dir.as_os_str().is_empty() {
            return Err(DocsError::InvalidConfig(
                "upload directory cannot be empty".into(),
            ));
        }
        if max_upload_bytes == 0 {
            return Err(DocsError::InvalidConfig(
                "max upload size must be greater than zero".into(),
            ));
        }

        let database_set = database.is_some();
        Ok(Self {
            upload_dir,
            database,
            section_filter_policy,
            max_upload_bytes,
            database_url_set: database_set,
            database_name_set: database_set,
        })
    }

    /// Configuration for tests and local runs: in-memory store, default limits.
    pub fn in_memory(upload_dir: PathBuf) -> DocsResult<Self> {
        Self::new(
            upload_dir,
            None,
            SectionFilterPolicy::default(),
            DEFAULT_MAX_UPLOAD_BYTES,
        )
    }

    /// Resolve the configuration from process environment variables.
    ///
    /// Call this once at startup, after loading any `.env` file.
    pub fn from_env() -> DocsResult<Self> {
        let var = |key: &str| std::env::var(key).ok();
        let url = var("DATABASE_URL");
        let name = var("DATABASE_NAME");
        let url_set = non_blank(url.clone()).is_some();
        let name_set = non_blank(name.clone()).is_some();

        Ok(Self::new(
            upload_dir_from_env_value(var("UPLOAD_DIR")),
            database_config_from_env_values(url, name)?,
            section_filter_policy_from_env_value(var("DOCSOS_SECTION_FILTER"))?,
            max_upload_bytes_from_env_value(var("DOCSOS_MAX_UPLOAD_BYTES"))?,
        )?
        .with_database_env(url_set, name_set))
    }

    /// Records whether `DATABASE_URL` and `DATABASE_NAME` were present, independently of
    /// whether they formed a usable database configuration.
    pub fn with_database_env(mut self, url_set: bool, name_set: bool) -> Self {
        self.database_url_set = url_set;
        self.database_name_set = name_set;
        self
    }

    pub fn database_url_set(&self) -> bool {
        self.database_url_set
    }

    pub fn database_name_set(&self) -> bool {
        self.database_name_set
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn database(&self) -> Option<&DatabaseConfig> {
        self.database.as_ref()
    }

    pub fn section_filter_policy(&self) -> SectionFilterPolicy {
        self.section_filter_policy
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the database settings from `DATABASE_URL` / `DATABASE_NAME` values.
///
/// Neither set selects the in-memory store. A URL without a name is a configuration error; a
/// name without a URL is ignored with a warning.
pub fn database_config_from_env_values(
    url: Option<String>,
    name: Option<String>,
) -> DocsResult<Option<DatabaseConfig>> {
    match (non_blank(url), non_blank(name)) {
        (Some(url), Some(name)) => DatabaseConfig::new(url, name).map(Some),
        (Some(_), None) => Err(DocsError::InvalidConfig(
            "DATABASE_URL is set but DATABASE_NAME is not".into(),
        )),
        (None, Some(name)) => {
            tracing::warn!("DATABASE_NAME={} ignored because DATABASE_URL is not set", name);
            Ok(None)
        }
        (None, None) => Ok(None),
    }
}

/// Resolve the upload directory; blank or missing values fall back to [`DEFAULT_UPLOAD_DIR`].
pub fn upload_dir_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into()))
}

pub fn section_filter_policy_from_env_value(
    value: Option<String>,
) -> DocsResult<SectionFilterPolicy> {
    non_blank(value)
        .map(|v| v.parse::<SectionFilterPolicy>())
        .transpose()
        .map(Option::unwrap_or_default)
}

pub fn max_upload_bytes_from_env_value(value: Option<String>) -> DocsResult<usize> {
    let Some(raw) = non_blank(value) else {
        return Ok(DEFAULT_MAX_UPLOAD_BYTES);
    };
    raw.parse::<usize>()
        .ok()
        .filter(|bytes| *bytes > 0)
        .ok_or_else(|| {
            DocsError::InvalidConfig(format!(
                "max upload size must be a positive integer, got '{}'",
                raw
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_requires_both_values() {
        let cfg = database_config_from_env_values(
            Some("mongodb://localhost:27017".into()),
            Some("docsos".into()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(cfg.name(), "docsos");
        assert_eq!(cfg.url(), "mongodb://localhost:27017");

        assert!(database_config_from_env_values(None, None).unwrap().is_none());
        assert!(database_config_from_env_values(Some("  ".into()), None)
            .unwrap()
            .is_none());
        assert!(database_config_from_env_values(None, Some("docsos".into()))
            .unwrap()
            .is_none());
        assert!(matches!(
            database_config_from_env_values(Some("mongodb://localhost".into()), None),
            Err(DocsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_database_config_debug_redacts_url() {
        let cfg = DatabaseConfig::new("mongodb://user:secret@db:27017", "docsos").unwrap();
        let debug = format!("{:?}", cfg);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("docsos"));
    }

    #[test]
    fn test_section_filter_policy_parsing() {
        assert_eq!(
            section_filter_policy_from_env_value(None).unwrap(),
            SectionFilterPolicy::Ignore
        );
        assert_eq!(
            section_filter_policy_from_env_value(Some("REJECT".into())).unwrap(),
            SectionFilterPolicy::Reject
        );
        assert!(section_filter_policy_from_env_value(Some("strict".into())).is_err());
    }

    #[test]
    fn test_max_upload_bytes_parsing() {
        assert_eq!(
            max_upload_bytes_from_env_value(None).unwrap(),
            DEFAULT_MAX_UPLOAD_BYTES
        );
        assert_eq!(
            max_upload_bytes_from_env_value(Some("2048".into())).unwrap(),
            2048
        );
        assert!(max_upload_bytes_from_env_value(Some("0".into())).is_err());
        assert!(max_upload_bytes_from_env_value(Some("ten".into())).is_err());
    }

    #[test]
    fn test_upload_dir_default() {
        assert_eq!(upload_dir_from_env_value(None), PathBuf::from("uploads"));
        assert_eq!(
            upload_dir_from_env_value(Some("/srv/assets".into())),
            PathBuf::from("/srv/assets")
        );
    }

    #[test]
    fn test_core_config_rejects_zero_limit() {
        let result = CoreConfig::new(
            PathBuf::from("uploads"),
            None,
            SectionFilterPolicy::Ignore,
            0,
        );
        assert!(matches!(result, Err(DocsError::InvalidConfig(_))));
    }
}
