//! Output formatting for CLI commands.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactMetadata;
use crate::cli::args::{AngelArgs, OutputFormat};
use crate::error::Result;
use crate::finance::advisor::round_money;
use crate::finance::transaction::{AnalysisResponse, Category};
use crate::ml::metrics::ClassificationReport;

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Result structure for corpus generation.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub path: String,
    pub rows: usize,
    pub categories: BTreeMap<String, usize>,
}

/// Result structure for training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub artifact_path: String,
    pub artifact_id: String,
    pub n_train: usize,
    pub n_test: usize,
    pub labels: Vec<String>,
    pub vocabulary_size: usize,
    pub report: ClassificationReport,
}

/// One classified description.
#[derive(Debug, Serialize, Deserialize)]
pub struct Prediction {
    pub description: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<Vec<Vote>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Vote {
    pub category: String,
    pub share: f64,
}

/// Result structure for classification.
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predictions(pub Vec<Prediction>);

/// Output a result in the requested format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &AngelArgs,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, message, result, args.output_format, args.pretty, args.verbosity())
}

/// Write a result to `out`.
pub fn write_result<T: Serialize + HumanOutput>(
    out: &mut dyn Write,
    message: &str,
    result: &T,
    format: OutputFormat,
    pretty: bool,
    verbosity: u8,
) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if verbosity > 1 {
                writeln!(out, "{message}")?;
                writeln!(out)?;
            }
            result.write_human(out)?;
        }
        OutputFormat::Json => {
            let json = if pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            writeln!(out, "{json}")?;
        }
    }
    out.flush()?;
    Ok(())
}

impl HumanOutput for GenerationSummary {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Generated {} transactions at {}", self.rows, self.path)?;
        for (category, count) in &self.categories {
            writeln!(out, "  {category:<15} {count:>6}")?;
        }
        Ok(())
    }
}

impl HumanOutput for TrainingSummary {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Training set: {} samples", self.n_train)?;
        writeln!(out, "Test set: {} samples", self.n_test)?;
        writeln!(out, "Categories: {}", self.labels.join(", "))?;
        writeln!(out, "Vocabulary: {} terms", self.vocabulary_size)?;
        writeln!(out)?;
        writeln!(
            out,
            "Model Accuracy: {:.4} ({:.2}%)",
            self.report.accuracy,
            self.report.accuracy * 100.0
        )?;
        writeln!(out)?;
        writeln!(out, "Classification Report:")?;
        write!(out, "{}", self.report)?;
        writeln!(out)?;
        writeln!(out, "Model {} saved to: {}", self.artifact_id, self.artifact_path)
    }
}

impl HumanOutput for Predictions {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        for prediction in &self.0 {
            writeln!(out, "{} -> {}", prediction.description, prediction.category)?;
            if let Some(votes) = &prediction.votes {
                for vote in votes {
                    writeln!(out, "    {:<15} {:>6.1}%", vote.category, vote.share * 100.0)?;
                }
            }
        }
        Ok(())
    }
}

impl HumanOutput for AnalysisResponse {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Income:        ₹{:.2}", round_money(self.income))?;
        writeln!(out, "Expenses:      ₹{:.2}", round_money(self.expenses))?;
        writeln!(out, "Total savings: ₹{:.2}", round_money(self.total_savings))?;
        writeln!(out)?;
        writeln!(out, "Category breakdown:")?;
        for (category, amount) in self.category_breakdown.sorted() {
            writeln!(out, "  {:<15} ₹{:.2}", category.as_str(), round_money(amount))?;
        }
        writeln!(out)?;
        writeln!(out, "Advice: {}", self.advice)
    }
}

impl HumanOutput for ArtifactMetadata {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Artifact:       {}", self.id)?;
        writeln!(out, "Format version: {}", self.format_version)?;
        writeln!(out, "Trained at:     {}", self.trained_at.to_rfc3339())?;
        writeln!(out, "Rows:           {} train / {} held out", self.n_train, self.n_test)?;
        writeln!(out, "Accuracy:       {:.4}", self.accuracy)?;
        writeln!(out, "Vocabulary:     {} terms", self.vocabulary_size)?;
        writeln!(out, "Trees:          {}", self.forest.n_estimators)?;
        writeln!(out, "Categories:     {}", self.labels.join(", "))
    }
}
