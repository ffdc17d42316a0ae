//! The training pipeline.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::normalize;
use crate::artifact::{ArtifactMetadata, TrainedArtifact};
use crate::config::AngelConfig;
use crate::error::{AngelError, Result};
use crate::ml::forest::{ForestConfig, RandomForestClassifier};
use crate::ml::metrics::ClassificationReport;
use crate::ml::split::stratified_split;
use crate::ml::tfidf::{TfIdfConfig, TfIdfVectorizer};
use crate::training::dataset::LabeledRow;

/// Held-out split settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of every category held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the split shuffle.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AngelError::invalid_config(format!(
                "test_fraction must be between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Fitted artifact plus its held-out evaluation.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: TrainedArtifact,
    pub report: ClassificationReport,
}

/// Normalize, split, fit, evaluate, package.
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    training: TrainingConfig,
    vectorizer: TfIdfConfig,
    forest: ForestConfig,
}

impl TrainingPipeline {
    pub fn new(training: TrainingConfig, vectorizer: TfIdfConfig, forest: ForestConfig) -> Result<Self> {
        training.validate()?;
        vectorizer.validate()?;
        forest.validate()?;
        Ok(Self {
            training,
            vectorizer,
            forest,
        })
    }

    pub fn from_config(config: &AngelConfig) -> Result<Self> {
        Self::new(
            config.training.clone(),
            config.vectorizer.clone(),
            config.forest.clone(),
        )
    }

    /// Fit on `rows` and evaluate on the held-out part. Nothing is written.
    pub fn fit(&self, rows: &[LabeledRow]) -> Result<TrainingOutcome> {
        if rows.is_empty() {
            return Err(AngelError::insufficient_data("dataset is empty"));
        }

        let documents: Vec<String> = rows.iter().map(|r| normalize(&r.description)).collect();
        let labels: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();

        let mut distribution: BTreeMap<&str, usize> = BTreeMap::new();
        for label in &labels {
            *distribution.entry(*label).or_default() += 1;
        }
        log::info!("{} rows in {} categories", rows.len(), distribution.len());
        for (label, count) in &distribution {
            log::debug!("  {label}: {count}");
        }

        let split = stratified_split(&labels, self.training.test_fraction, self.training.seed)?;
        log::info!(
            "training set: {} rows, held-out set: {} rows",
            split.train.len(),
            split.test.len()
        );

        let train_docs: Vec<String> = split.train.iter().map(|&i| documents[i].clone()).collect();
        let train_labels: Vec<&str> = split.train.iter().map(|&i| labels[i]).collect();

        let mut vectorizer = TfIdfVectorizer::new(self.vectorizer.clone())?;
        let train_vectors = vectorizer.fit_transform(&train_docs)?;
        log::info!("vocabulary: {} terms", vectorizer.vocabulary_size());

        let forest = RandomForestClassifier::fit(self.forest.clone(), &train_vectors, &train_labels)?;

        let mut y_true = Vec::with_capacity(split.test.len());
        let mut y_pred = Vec::with_capacity(split.test.len());
        for &i in &split.test {
            let features = vectorizer.transform(&documents[i])?;
            y_true.push(labels[i].to_string());
            y_pred.push(forest.predict(&features)?.to_string());
        }
        let report = ClassificationReport::evaluate(&y_true, &y_pred)?;
        log::info!("held-out accuracy: {:.4}", report.accuracy);

        let metadata = ArtifactMetadata::new(
            &vectorizer,
            &forest,
            split.train.len(),
            split.test.len(),
            report.accuracy,
        );
        let artifact = TrainedArtifact::new(metadata, vectorizer, forest)?;

        Ok(TrainingOutcome { artifact, report })
    }

    /// Fit, then write the artifact to `output`. If anything fails no file is
    /// written or replaced.
    pub fn run<P: AsRef<Path>>(&self, rows: &[LabeledRow], output: P) -> Result<TrainingOutcome> {
        let outcome = self.fit(rows)?;
        outcome.artifact.save(output)?;
        Ok(outcome)
    }

    pub fn training_config(&self) -> &TrainingConfig {
        &self.training
    }

    pub fn vectorizer_config(&self) -> &TfIdfConfig {
        &self.vectorizer
    }

    pub fn forest_config(&self) -> &ForestConfig {
        &self.forest
    }
}
