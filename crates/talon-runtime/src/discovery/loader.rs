//! Resolving source files to the classes they export.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use talon_core::Export;
use thiserror::Error;

/// Why a candidate file yielded no exports.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No export in this binary was defined in the file.
    #[error("{} is not compiled into this binary", path.display())]
    NotLinked { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A custom loader rejected the file.
    #[error("failed to load {}: {message}", path.display())]
    Failed { path: PathBuf, message: String },
}

/// Produces the exports defined in a source file.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Vec<Export>, LoadError>;
}

/// Resolves files against the link-time export manifest.
#[derive(Debug, Clone, Copy)]
pub struct ManifestLoader {
    exports: &'static [Export],
}

impl ManifestLoader {
    /// Uses every `#[export]` linked into the binary.
    pub fn new() -> Self {
        Self::with_exports(talon_core::exports())
    }

    pub fn with_exports(exports: &'static [Export]) -> Self {
        Self { exports }
    }

    fn matching(&self, path: &Path) -> Vec<Export> {
        let mut found: Vec<Export> = self
            .exports
            .iter()
            .filter(|export| export.defined_in(path))
            .copied()
            .collect();
        found.sort_by_key(|export| export.name());
        found
    }
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModuleLoader for ManifestLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Export>, LoadError> {
        let found = self.matching(path);
        if !found.is_empty() {
            return Ok(found);
        }

        // The directory may be reached through a symlink.
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let found = self.matching(&canonical);
        if found.is_empty() {
            return Err(LoadError::NotLinked {
                path: path.to_path_buf(),
            });
        }
        Ok(found)
    }
}
