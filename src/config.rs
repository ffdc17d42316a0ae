//! Engine configuration.
//!
//! Every section has defaults and `#[serde(default)]`, so a JSON file only
//! needs the values it changes:
//!
//! ```json
//! { "forest": { "n_estimators": 50 }, "training": { "seed": 7 } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AngelError, Result};
use crate::ml::forest::ForestConfig;
use crate::ml::tfidf::TfIdfConfig;
use crate::training::pipeline::TrainingConfig;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngelConfig {
    /// Where the trained artifact is written and read.
    pub artifact_path: PathBuf,

    pub training: TrainingConfig,

    pub vectorizer: TfIdfConfig,

    pub forest: ForestConfig,
}

impl Default for AngelConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("saved_models/expense_classifier.bin"),
            training: TrainingConfig::default(),
            vectorizer: TfIdfConfig::default(),
            forest: ForestConfig::default(),
        }
    }
}

impl AngelConfig {
    /// Load from a JSON file. The result is validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AngelError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: AngelConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.artifact_path.as_os_str().is_empty() {
            return Err(AngelError::invalid_config("artifact_path is empty"));
        }
        self.training.validate()?;
        self.vectorizer.validate()?;
        self.forest.validate()
    }
}
