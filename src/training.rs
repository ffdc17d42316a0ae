//! Offline training: dataset loading, stratified split, fitting, evaluation
//! and artifact emission.

pub mod dataset;
pub mod pipeline;

pub use dataset::{LabeledRow, load_labeled_csv, read_labeled_csv};
pub use pipeline::{TrainingConfig, TrainingOutcome, TrainingPipeline};
