//! Convention-based class discovery.
//!
//! For each kind, discovery lists the configured directory (not
//! recursively), keeps the files whose name carries the kind's suffix, asks
//! the [`ModuleLoader`] for the classes each file exports and keeps the ones
//! whose name ends with the suffix and that implement the kind's contract.
//!
//! Failures are contained: an unreadable directory yields nothing, a file
//! that fails to load is skipped, and neither stops the other files.

mod loader;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use talon_config::PathsConfig;
use talon_core::{ClassKind, Export};
use tracing::{Instrument, debug, error, info_span, warn};

pub use loader::{LoadError, ManifestLoader, ModuleLoader};

/// A class found on disk.
#[derive(Debug, Clone)]
pub struct Discovered {
    pub kind: ClassKind,
    pub export: Export,
    /// The file the class was found in.
    pub path: PathBuf,
}

/// Scans the configured directories for classes.
#[derive(Clone)]
pub struct Discovery {
    paths: PathsConfig,
    loader: Arc<dyn ModuleLoader>,
}

impl Discovery {
    /// Discovery backed by the export manifest.
    pub fn new(paths: PathsConfig) -> Self {
        Self::with_loader(paths, Arc::new(ManifestLoader::new()))
    }

    pub fn with_loader(paths: PathsConfig, loader: Arc<dyn ModuleLoader>) -> Self {
        Self { paths, loader }
    }

    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    pub async fn discover_entities(&self) -> Vec<Discovered> {
        self.discover(ClassKind::Entity).await
    }

    pub async fn discover_commands(&self) -> Vec<Discovered> {
        self.discover(ClassKind::Command).await
    }

    pub async fn discover_jobs(&self) -> Vec<Discovered> {
        self.discover(ClassKind::Job).await
    }

    pub async fn discover_events(&self) -> Vec<Discovered> {
        self.discover(ClassKind::Event).await
    }

    /// Discovers the classes of `kind` in its configured directory.
    ///
    /// Results are ordered by file name, then by class name.
    pub async fn discover(&self, kind: ClassKind) -> Vec<Discovered> {
        let dir = kind.directory(&self.paths);
        let span = info_span!("discover", kind = %kind, dir = %dir.display());
        self.discover_in(kind, dir).instrument(span).await
    }

    async fn discover_in(&self, kind: ClassKind, dir: &Path) -> Vec<Discovered> {
        let files = match candidate_files(kind, dir).await {
            Ok(files) => files,
            Err(e) => {
                error!(error = %e, "Failed to read discovery directory");
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        for path in files {
            let exports = match self.loader.load(&path).await {
                Ok(exports) => exports,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping file that failed to load");
                    continue;
                }
            };

            for export in exports {
                if export.conforms_to(kind) {
                    debug!(class = export.name(), file = %path.display(), "Discovered {kind}");
                    found.push(Discovered {
                        kind,
                        export,
                        path: path.clone(),
                    });
                } else if kind.matches_name(export.name()) {
                    warn!(
                        class = export.name(),
                        file = %path.display(),
                        "Ignoring class that does not implement the {kind} contract"
                    );
                }
            }
        }

        debug!(count = found.len(), "Discovery finished");
        found
    }
}

impl std::fmt::Debug for Discovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discovery")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

/// Regular files directly inside `dir` whose name matches `kind`, sorted.
async fn candidate_files(kind: ClassKind, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !kind.matches_file(&path) {
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!(file = %path.display(), error = %e, "Failed to stat file"),
        }
    }

    files.sort();
    Ok(files)
}
