//! Description -> category classification.
//!
//! [`CategoryClassifier`] is the seam the financial analyzer depends on.
//! [`ClassificationService`] is the production implementation: it owns a
//! [`TrainedArtifact`], loaded lazily through an [`ArtifactLoader`] the first
//! time it is needed.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::artifact::{ArtifactMetadata, TrainedArtifact};
use crate::error::{ArtifactError, Result};
use crate::finance::transaction::Category;

/// Category classifier trait.
///
/// Implementations must be deterministic: descriptions that normalize to the
/// same text get the same category.
pub trait CategoryClassifier: Send + Sync {
    /// Predict the category for a transaction description.
    fn classify(&self, description: &str) -> Result<Category>;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}

/// Source of the trained artifact.
pub trait ArtifactLoader: Send + Sync {
    fn load(&self) -> std::result::Result<TrainedArtifact, ArtifactError>;

    /// Where the artifact comes from, for logs.
    fn describe(&self) -> String;
}

/// Reads the artifact from a file.
#[derive(Debug, Clone)]
pub struct FileArtifactLoader {
    path: PathBuf,
}

impl FileArtifactLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactLoader for FileArtifactLoader {
    fn load(&self) -> std::result::Result<TrainedArtifact, ArtifactError> {
        TrainedArtifact::load(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Hands out an artifact that is already in memory (or a canned failure).
#[derive(Debug, Clone)]
pub struct InMemoryArtifactLoader {
    artifact: std::result::Result<TrainedArtifact, ArtifactError>,
}

impl InMemoryArtifactLoader {
    pub fn new(artifact: TrainedArtifact) -> Self {
        Self {
            artifact: Ok(artifact),
        }
    }

    pub fn failing(error: ArtifactError) -> Self {
        Self {
            artifact: Err(error),
        }
    }
}

impl ArtifactLoader for InMemoryArtifactLoader {
    fn load(&self) -> std::result::Result<TrainedArtifact, ArtifactError> {
        self.artifact.clone()
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Normalize -> vectorize -> vote, over a lazily loaded artifact.
///
/// The artifact is loaded at most once. Concurrent first callers block on the
/// same load. If the load fails, that error is kept and returned to every
/// later caller; there is no retry and no fallback category.
pub struct ClassificationService {
    loader: Box<dyn ArtifactLoader>,
    artifact: OnceLock<std::result::Result<TrainedArtifact, ArtifactError>>,
}

impl ClassificationService {
    pub fn new(loader: Box<dyn ArtifactLoader>) -> Self {
        Self {
            loader,
            artifact: OnceLock::new(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::new(Box::new(FileArtifactLoader::new(path)))
    }

    pub fn from_artifact(artifact: TrainedArtifact) -> Self {
        Self::new(Box::new(InMemoryArtifactLoader::new(artifact)))
    }

    /// The loaded artifact, loading it on first use.
    pub fn artifact(&self) -> std::result::Result<&TrainedArtifact, ArtifactError> {
        self.artifact
            .get_or_init(|| {
                let loaded = self.loader.load();
                if let Err(e) = &loaded {
                    log::error!("failed to load artifact from {}: {e}", self.loader.describe());
                }
                loaded
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Whether a load has been attempted.
    pub fn is_loaded(&self) -> bool {
        self.artifact.get().is_some()
    }

    pub fn labels(&self) -> Result<&[String]> {
        Ok(self.artifact()?.labels())
    }

    pub fn metadata(&self) -> Result<&ArtifactMetadata> {
        Ok(self.artifact()?.metadata())
    }

    /// Per-label vote fractions, in label order.
    pub fn explain(&self, description: &str) -> Result<Vec<(String, f64)>> {
        self.artifact()?.explain(description)
    }
}

impl CategoryClassifier for ClassificationService {
    fn classify(&self, description: &str) -> Result<Category> {
        let label = self.artifact()?.predict(description)?;
        Ok(Category::new(label))
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}

impl std::fmt::Debug for ClassificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationService")
            .field("source", &self.loader.describe())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
