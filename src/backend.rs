//! Language backend discovery.
//!
//! A backend directory holds one `<language>.ini` configuration per installed
//! language. Submissions are validated against it before a job is created.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::error::BackendError;

/// File extension of backend configurations.
const CONFIG_EXTENSION: &str = "ini";

/// Language names are plain file stems; no separators or leading dots.
static LANGUAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid regex"));

/// Resolves language names to profiler configurations.
#[async_trait]
pub trait BackendResolver: Send + Sync {
    /// Path of the validated configuration for `language`.
    async fn resolve(&self, language: &str) -> Result<PathBuf, BackendError>;

    /// All installed languages, sorted.
    async fn languages(&self) -> Result<Vec<String>, BackendError>;
}

/// Backends stored as `<dir>/<language>.ini`.
#[derive(Debug, Clone)]
pub struct DirectoryBackends {
    dir: PathBuf,
}

impl DirectoryBackends {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl BackendResolver for DirectoryBackends {
    async fn resolve(&self, language: &str) -> Result<PathBuf, BackendError> {
        if !LANGUAGE_NAME.is_match(language) {
            return Err(BackendError::Invalid {
                language: language.to_string(),
                reason: "not a valid language name".to_string(),
            });
        }

        let path = self.dir.join(format!("{language}.{CONFIG_EXTENSION}"));
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BackendError::NotFound {
                    language: language.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(BackendError::Invalid {
                language: language.to_string(),
                reason: format!("{} is not a regular file", path.display()),
            });
        }
        if let Err(e) = tokio::fs::File::open(&path).await {
            return Err(BackendError::Invalid {
                language: language.to_string(),
                reason: format!("cannot read {}: {}", path.display(), e),
            });
        }

        debug!(language, config = %path.display(), "Resolved language backend");
        Ok(path)
    }

    async fn languages(&self) -> Result<Vec<String>, BackendError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut languages = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CONFIG_EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if LANGUAGE_NAME.is_match(stem) {
                    languages.push(stem.to_string());
                }
            }
        }

        languages.sort();
        Ok(languages)
    }
}
