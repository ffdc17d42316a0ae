//! Error types for the loan-angel engine.
//!
//! Every fallible operation returns [`Result`], whose error side is the
//! [`AngelError`] enum. Failures around the trained artifact have their own
//! cloneable [`ArtifactError`], because the classification service caches a
//! failed load and hands the same error to every later caller.
//!
//! # Examples
//!
//! ```
//! use loan_angel::error::{AngelError, Result};
//!
//! fn check(rows: usize) -> Result<()> {
//!     if rows == 0 {
//!         return Err(AngelError::insufficient_data("dataset is empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for loan-angel operations.
#[derive(Error, Debug)]
pub enum AngelError {
    /// I/O errors (reading datasets, writing artifacts, ...)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The trained artifact could not be loaded
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Caller supplied an empty or malformed request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough labelled rows to split and fit
    #[error("Training data insufficient: {0}")]
    TrainingDataInsufficient(String),

    /// A dataset file could not be parsed
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model fitting or prediction failed
    #[error("Model error: {0}")]
    Model(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Failures while loading the trained artifact.
///
/// None of these are retried: the first one seen by a
/// [`ClassificationService`](crate::classifier::ClassificationService) is
/// returned for the rest of its lifetime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("Artifact not found at {path}")]
    Missing { path: String },

    #[error("Artifact at {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Artifact at {path} has format version {found}, expected {expected}")]
    UnsupportedVersion {
        path: String,
        found: u32,
        expected: u32,
    },
}

impl From<bincode::Error> for AngelError {
    fn from(err: bincode::Error) -> Self {
        AngelError::Serialization(err.to_string())
    }
}

/// Result type alias for operations that may fail with AngelError.
pub type Result<T> = std::result::Result<T, AngelError>;

impl AngelError {
    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        AngelError::InvalidInput(msg.into())
    }

    /// Create a new insufficient training data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        AngelError::TrainingDataInsufficient(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        AngelError::Dataset(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        AngelError::InvalidConfig(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        AngelError::Model(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        AngelError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        AngelError::Other(msg.into())
    }

    /// Whether this error came from loading the artifact.
    pub fn is_artifact_error(&self) -> bool {
        matches!(self, AngelError::Artifact(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = AngelError::invalid_input("no transactions provided");
        assert_eq!(error.to_string(), "Invalid input: no transactions provided");

        let error = AngelError::insufficient_data("category 'Rent' has 1 row");
        assert_eq!(
            error.to_string(),
            "Training data insufficient: category 'Rent' has 1 row"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let angel_error = AngelError::from(io_error);

        match angel_error {
            AngelError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_artifact_error_is_transparent() {
        let error = AngelError::from(ArtifactError::Missing {
            path: "model.bin".to_string(),
        });
        assert!(error.is_artifact_error());
        assert_eq!(error.to_string(), "Artifact not found at model.bin");
    }
}
