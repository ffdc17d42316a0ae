//! The trained artifact and its on-disk format.
//!
//! An artifact bundles the fitted [`TfIdfVectorizer`], the fitted
//! [`RandomForestClassifier`] and descriptive [`ArtifactMetadata`]. It is
//! written once by the training pipeline and only ever read afterwards.
//!
//! # File layout
//!
//! All integers are little endian.
//!
//! | Offset | Size | Field                      |
//! |--------|------|----------------------------|
//! | 0      | 4    | magic `LANG`               |
//! | 4      | 4    | format version             |
//! | 8      | 4    | CRC32 of the payload       |
//! | 12     | 8    | payload length in bytes    |
//! | 20     | n    | bincode payload            |

use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::normalize;
use crate::error::{AngelError, ArtifactError, Result};
use crate::ml::forest::{ForestConfig, RandomForestClassifier};
use crate::ml::tfidf::{TfIdfConfig, TfIdfVectorizer};

/// File magic.
pub const MAGIC: &[u8; 4] = b"LANG";

/// Current format version. Bumped whenever the payload layout changes.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 20;

/// Descriptive data stored next to the fitted models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub id: Uuid,
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub n_train: usize,
    pub n_test: usize,
    /// Closed label set, lexicographically ordered.
    pub labels: Vec<String>,
    /// Accuracy on the held-out partition.
    pub accuracy: f64,
    pub vocabulary_size: usize,
    pub vectorizer: TfIdfConfig,
    pub forest: ForestConfig,
}

impl ArtifactMetadata {
    /// Metadata for freshly fitted models, stamped with a new id and the
    /// current time.
    pub fn new(
        vectorizer: &TfIdfVectorizer,
        forest: &RandomForestClassifier,
        n_train: usize,
        n_test: usize,
        accuracy: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            format_version: FORMAT_VERSION,
            trained_at: Utc::now(),
            n_train,
            n_test,
            labels: forest.labels().to_vec(),
            accuracy,
            vocabulary_size: vectorizer.vocabulary_size(),
            vectorizer: vectorizer.config().clone(),
            forest: forest.config().clone(),
        }
    }
}

/// Immutable bundle of fitted vectorizer, forest and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedArtifact {
    metadata: ArtifactMetadata,
    vectorizer: TfIdfVectorizer,
    forest: RandomForestClassifier,
}

impl TrainedArtifact {
    pub fn new(
        metadata: ArtifactMetadata,
        vectorizer: TfIdfVectorizer,
        forest: RandomForestClassifier,
    ) -> Result<Self> {
        let artifact = Self {
            metadata,
            vectorizer,
            forest,
        };
        artifact.check_consistency()?;
        Ok(artifact)
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn labels(&self) -> &[String] {
        self.forest.labels()
    }

    /// Normalize, vectorize and vote.
    pub fn predict(&self, description: &str) -> Result<&str> {
        let features = self.vectorizer.transform(&normalize(description))?;
        self.forest.predict(&features)
    }

    /// Per-label vote fractions for a description.
    pub fn explain(&self, description: &str) -> Result<Vec<(String, f64)>> {
        let features = self.vectorizer.transform(&normalize(description))?;
        self.forest.predict_votes(&features)
    }

    fn check_consistency(&self) -> Result<()> {
        if !self.vectorizer.is_fitted() {
            return Err(AngelError::serialization("vectorizer is not fitted"));
        }
        if self.vectorizer.vocabulary_size() != self.forest.n_features() {
            return Err(AngelError::serialization(format!(
                "vocabulary has {} terms but the forest expects {} features",
                self.vectorizer.vocabulary_size(),
                self.forest.n_features()
            )));
        }
        if self.metadata.labels != self.forest.labels() {
            return Err(AngelError::serialization(
                "metadata label set differs from the forest",
            ));
        }
        self.forest.check_consistency()
    }

    /// Encode header and payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.write_all(MAGIC)?;
        out.write_u32::<LittleEndian>(FORMAT_VERSION)?;
        out.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
        out.write_u64::<LittleEndian>(payload.len() as u64)?;
        out.write_all(&payload)?;
        Ok(out)
    }

    /// Decode bytes read from `path`. The path is only used in errors.
    pub fn from_bytes(bytes: &[u8], path: &str) -> std::result::Result<Self, ArtifactError> {
        let corrupt = |reason: String| ArtifactError::Corrupt {
            path: path.to_string(),
            reason,
        };

        if bytes.len() < HEADER_LEN {
            return Err(corrupt(format!(
                "file is {} bytes, shorter than the {HEADER_LEN} byte header",
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let mut magic = [0u8; 4];
        cursor
            .read_exact(&mut magic)
            .map_err(|e| corrupt(e.to_string()))?;
        if &magic != MAGIC {
            return Err(corrupt("bad magic".to_string()));
        }

        let header = (|| -> io::Result<(u32, u32, u64)> {
            Ok((
                cursor.read_u32::<LittleEndian>()?,
                cursor.read_u32::<LittleEndian>()?,
                cursor.read_u64::<LittleEndian>()?,
            ))
        })();
        let (version, checksum, length) = header.map_err(|e| corrupt(e.to_string()))?;

        if version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                path: path.to_string(),
                found: version,
                expected: FORMAT_VERSION,
            });
        }

        let payload = &bytes[HEADER_LEN..];
        if payload.len() as u64 != length {
            return Err(corrupt(format!(
                "header declares {length} payload bytes, found {}",
                payload.len()
            )));
        }
        if crc32fast::hash(payload) != checksum {
            return Err(corrupt("checksum mismatch".to_string()));
        }

        let artifact: TrainedArtifact =
            bincode::deserialize(payload).map_err(|e| corrupt(e.to_string()))?;
        artifact
            .check_consistency()
            .map_err(|e| corrupt(e.to_string()))?;
        Ok(artifact)
    }

    /// Write atomically: a sibling temp file is written, synced and renamed
    /// over `path`. On failure any existing file at `path` is untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let temp = temp_path(path)?;

        let written = (|| -> io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&temp, path)
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        log::info!(
            "wrote artifact {} ({} bytes) to {}",
            self.metadata.id,
            bytes.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ArtifactError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ArtifactError::Missing {
                path: display.clone(),
            },
            _ => ArtifactError::Corrupt {
                path: display.clone(),
                reason: format!("unreadable: {e}"),
            },
        })?;

        let artifact = Self::from_bytes(&bytes, &display)?;
        log::info!(
            "loaded artifact {} from {} ({} labels, {} terms)",
            artifact.metadata.id,
            display,
            artifact.metadata.labels.len(),
            artifact.metadata.vocabulary_size
        );
        Ok(artifact)
    }
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| AngelError::invalid_input(format!("{} is not a file path", path.display())))?;
    let mut temp = name.to_os_string();
    temp.push(format!(".{}.tmp", std::process::id()));
    Ok(path.with_file_name(temp))
}
