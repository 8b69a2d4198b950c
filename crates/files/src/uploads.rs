//! Upload storage service implementation
//!
//! [`UploadService`] owns one flat upload root. Each stored asset is a single file named after
//! the client's filename (reduced to its last path component), with a numeric suffix when that
//! name is already taken.
//!
//! # Collision avoidance
//!
//! Candidates are probed in order (`name`, `base_1.ext`, `base_2.ext`, …) and each one is
//! claimed with `create_new`, which fails atomically if the file exists. Two concurrent uploads
//! of the same name therefore end up under two different names; neither overwrites the other.
//! Under contention a suffix may be claimed out of order, so gaps are possible but duplicates
//! are not.

use crate::{FilesError, MAX_NAME_ATTEMPTS, STATIC_URL_PREFIX};
use chrono::{DateTime, Utc};
use docsos_types::NonEmptyText;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Metadata for a stored upload
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StoredUpload {
    /// Name the asset was stored under, relative to the upload root
    pub filename: NonEmptyText,

    /// Relative URL for retrieval, `/static/<filename>`
    pub url: String,

    pub size_bytes: u64,

    /// Detected media type (MIME type), if available
    ///
    /// Best-effort detection from the content; not authoritative.
    pub media_type: Option<String>,

    /// Lowercase hex SHA-256 of the content
    pub sha256: String,

    pub stored_at: DateTime<Utc>,
}

/// Reduces a client-supplied filename to a safe final path component.
///
/// Both `/` and `\` count as separators so that browser-supplied paths such as
/// `C:\fakepath\x.png` keep only `x.png`.
///
/// # Errors
///
/// Returns [`FilesError::InvalidFilename`] if nothing usable remains, or the name is `.`/`..`
/// or contains a NUL byte. Surrounding whitespace is trimmed.
pub fn sanitize_filename(requested: &str) -> Result<NonEmptyText, FilesError> {
    let invalid = || FilesError::InvalidFilename(requested.to_string());

    let last = requested
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let name = NonEmptyText::new(last).map_err(|_| invalid())?;

    if matches!(name.as_str(), "." | "..") || name.as_str().contains('\0') {
        return Err(invalid());
    }

    Ok(name)
}

/// Returns the `attempt`-th candidate name for `filename`.
///
/// Attempt 0 is the name itself; attempt `n` inserts `_n` before the extension. The extension
/// is everything from the last dot, ignoring leading dots, so `.bashrc` has none and
/// `archive.tar.gz` becomes `archive.tar_1.gz`.
pub fn candidate_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }

    let leading_dots = filename.len() - filename.trim_start_matches('.').len();
    let (base, ext) = match filename[leading_dots..].rfind('.') {
        Some(i) => filename.split_at(leading_dots + i),
        None => (filename, ""),
    };

    format!("{}_{}{}", base, attempt, ext)
}

/// URL path an asset stored as `filename` is served from.
///
/// The name is percent-encoded as a single path segment, so `a#1.png` maps to
/// `/static/a%231.png`.
pub fn static_url(filename: &str) -> String {
    format!("{}/{}", STATIC_URL_PREFIX, urlencoding::encode(filename))
}

/// Stores uploaded assets under a single root directory
///
/// The service holds no state besides the root path and is safe to share between concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct UploadService {
    root_directory: PathBuf,
}

impl UploadService {
    /// Creates the service, creating the upload root if it is missing
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if:
    /// - the root cannot be created
    /// - the path exists but is not a directory
    /// - path canonicalisation fails
    pub fn new(root_directory: &Path) -> Result<Self, FilesError> {
        if root_directory.exists() && !root_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        fs::create_dir_all(root_directory).map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot create {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self { root_directory })
    }

    /// Returns the canonical upload root
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Stores `content` under the first free name derived from `requested_name`
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the requested name is unusable (`InvalidFilename`)
    /// - every candidate up to [`MAX_NAME_ATTEMPTS`] is taken (`NamesExhausted`)
    /// - the file cannot be created or written (`Io`); a partially written file is removed
    pub fn store(&self, requested_name: &str, content: &[u8]) -> Result<StoredUpload, FilesError> {
        let filename = sanitize_filename(requested_name)?;

        let (stored_name, path, mut file) = self.claim_name(filename.as_str())?;

        if let Err(e) = file.write_all(content).and_then(|()| file.sync_all()) {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path) {
                tracing::warn!(
                    "failed to remove partial upload {}: {}",
                    path.display(),
                    cleanup
                );
            }
            return Err(FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write upload to {}: {}", path.display(), e),
            )));
        }

        let media_type = infer::get(content).map(|kind| kind.mime_type().to_string());
        let sha256 = hex::encode(Sha256::digest(content));
        let url = static_url(stored_name.as_str());

        tracing::info!("stored upload {} ({} bytes)", stored_name, content.len());

        Ok(StoredUpload {
            filename: stored_name,
            url,
            size_bytes: content.len() as u64,
            media_type,
            sha256,
            stored_at: Utc::now(),
        })
    }

    /// Reads a stored asset by its exact stored filename
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the name is not a plain filename (`InvalidFilename`)
    /// - no such asset exists (`NotFound`)
    /// - the file cannot be read (`Io`)
    pub fn read(&self, filename: &str) -> Result<Vec<u8>, FilesError> {
        let safe = sanitize_filename(filename)?;
        if safe.as_str() != filename {
            return Err(FilesError::InvalidFilename(filename.to_string()));
        }

        let path = self.root_directory.join(safe.as_str());
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FilesError::NotFound(filename.to_string()))
            }
            Err(e) => Err(FilesError::Io(e)),
        }
    }

    /// Claims the first free candidate name with an exclusive create
    fn claim_name(&self, filename: &str) -> Result<(NonEmptyText, PathBuf, fs::File), FilesError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = candidate_name(filename, attempt);
            let path = self.root_directory.join(&candidate);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    let name = NonEmptyText::new(&candidate)
                        .map_err(|_| FilesError::InvalidFilename(candidate.clone()))?;
                    return Ok((name, path, file));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(FilesError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to create {}: {}", path.display(), e),
                    )))
                }
            }
        }

        Err(FilesError::NamesExhausted(
            filename.to_string(),
            MAX_NAME_ATTEMPTS,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn service() -> (TempDir, UploadService) {
        let temp = TempDir::new().unwrap();
        let service = UploadService::new(&temp.path().join("uploads")).unwrap();
        (temp, service)
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("uploads");

        let service = UploadService::new(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(service.root_directory(), root.canonicalize().unwrap());
    }

    #[test]
    fn test_new_rejects_file_as_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file.txt");
        fs::write(&root, "not a directory").unwrap();

        let result = UploadService::new(&root);
        assert!(matches!(result, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_candidate_names() {
        assert_eq!(candidate_name("x.png", 0), "x.png");
        assert_eq!(candidate_name("x.png", 1), "x_1.png");
        assert_eq!(candidate_name("x.png", 12), "x_12.png");
        assert_eq!(candidate_name("archive.tar.gz", 1), "archive.tar_1.gz");
        assert_eq!(candidate_name("noext", 2), "noext_2");
        assert_eq!(candidate_name(".bashrc", 1), ".bashrc_1");
        assert_eq!(candidate_name(".env.local", 1), ".env_1.local");
        assert_eq!(candidate_name("x.", 1), "x_1.");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("x.png").unwrap().as_str(), "x.png");
        assert_eq!(
            sanitize_filename("../../etc/passwd").unwrap().as_str(),
            "passwd"
        );
        assert_eq!(
            sanitize_filename("C:\\fakepath\\diagram.png").unwrap().as_str(),
            "diagram.png"
        );

        for bad in ["", "   ", ".", "..", "dir/", "a/..", "bad\0name"] {
            assert!(
                matches!(sanitize_filename(bad), Err(FilesError::InvalidFilename(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_sequential_uploads_never_overwrite() {
        let (_temp, service) = service();

        let first = service.store("x.png", b"first").unwrap();
        let second = service.store("x.png", b"second").unwrap();
        let third = service.store("x.png", b"third").unwrap();

        assert_eq!(first.filename.as_str(), "x.png");
        assert_eq!(second.filename.as_str(), "x_1.png");
        assert_eq!(third.filename.as_str(), "x_2.png");

        assert_eq!(service.read("x.png").unwrap(), b"first");
        assert_eq!(service.read("x_1.png").unwrap(), b"second");
        assert_eq!(service.read("x_2.png").unwrap(), b"third");
    }

    #[test]
    fn test_pre_existing_file_is_kept() {
        let (_temp, service) = service();
        fs::write(service.root_directory().join("notes.md"), b"original").unwrap();

        let stored = service.store("notes.md", b"new").unwrap();

        assert_eq!(stored.filename.as_str(), "notes_1.md");
        assert_eq!(
            fs::read(service.root_directory().join("notes.md")).unwrap(),
            b"original"
        );
    }

    #[test]
    fn test_concurrent_uploads_of_same_name_get_distinct_files() {
        // Exclusive create closes the check-then-write race: every writer gets its own name.
        let (_temp, service) = service();
        const WRITERS: usize = 16;

        let names: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..WRITERS)
                .map(|i| {
                    let service = &service;
                    scope.spawn(move || {
                        service
                            .store("race.png", format!("writer-{}", i).as_bytes())
                            .unwrap()
                            .filename
                            .into_inner()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), WRITERS);

        let mut contents: Vec<String> = names
            .iter()
            .map(|n| String::from_utf8(service.read(n).unwrap()).unwrap())
            .collect();
        contents.sort();
        let mut expected: Vec<String> = (0..WRITERS).map(|i| format!("writer-{}", i)).collect();
        expected.sort();
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_traversal_stays_inside_root() {
        let (temp, service) = service();

        let stored = service.store("../escape.txt", b"data").unwrap();

        assert_eq!(stored.filename.as_str(), "escape.txt");
        assert!(service.root_directory().join("escape.txt").is_file());
        assert!(!temp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_metadata() {
        let (_temp, service) = service();

        let stored = service.store("hello.txt", b"Hello, World!").unwrap();

        assert_eq!(stored.url, "/static/hello.txt");
        assert_eq!(stored.size_bytes, 13);
        assert_eq!(
            stored.sha256,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert!(stored.media_type.is_none());
    }

    #[test]
    fn test_url_is_percent_encoded() {
        let (_temp, service) = service();

        let stored = service.store("a#1 final.png", b"x").unwrap();

        assert_eq!(stored.filename.as_str(), "a#1 final.png");
        assert_eq!(stored.url, "/static/a%231%20final.png");
        assert_eq!(static_url("50%.png"), "/static/50%25.png");
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let (_temp, service) = service();
        fs::remove_dir(service.root_directory()).unwrap();

        let result = service.store("x.png", b"data");

        assert!(matches!(result, Err(FilesError::Io(_))));
        assert!(!service.root_directory().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_root_is_io_error_and_leaves_nothing() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, service) = service();
        let root = service.root_directory().to_path_buf();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory permissions.
        let check = root.join(".writable");
        if fs::write(&check, b"").is_ok() {
            fs::remove_file(&check).unwrap();
            fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = service.store("x.png", b"data");
        let leftover = fs::read_dir(&root).unwrap().count();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(FilesError::Io(_))));
        assert_eq!(leftover, 0);
    }

    #[test]
    fn test_media_type_detection() {
        let (_temp, service) = service();
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

        let stored = service.store("cover.png", &png_header).unwrap();

        assert_eq!(stored.media_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_empty_upload_is_stored() {
        let (_temp, service) = service();

        let stored = service.store("empty.bin", b"").unwrap();

        assert_eq!(stored.size_bytes, 0);
        assert_eq!(service.read("empty.bin").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_read_errors() {
        let (_temp, service) = service();

        assert!(matches!(
            service.read("missing.png"),
            Err(FilesError::NotFound(_))
        ));
        assert!(matches!(
            service.read("../secret"),
            Err(FilesError::InvalidFilename(_))
        ));
    }

    #[test]
    fn test_stored_upload_serialises() {
        let (_temp, service) = service();
        let stored = service.store("a.txt", b"a").unwrap();

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["filename"], "a.txt");
        assert_eq!(json["url"], "/static/a.txt");
    }
}
