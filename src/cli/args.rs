//! Command line argument parsing for the loan-angel CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::AngelConfig;

/// loan-angel - transaction categorisation and cash-flow advice
#[derive(Parser, Debug, Clone)]
#[command(name = "loan-angel")]
#[command(about = "Classify bank transactions and get cash-flow advice")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct AngelArgs {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl AngelArgs {
    /// Effective verbosity: 0 quiet, 1 default, 2 verbose, 3+ debug.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a synthetic labelled transaction corpus
    Generate(GenerateArgs),

    /// Train a classifier and write the artifact
    Train(TrainArgs),

    /// Classify transaction descriptions
    Classify(ClassifyArgs),

    /// Analyze a batch of transactions and print advice
    Analyze(AnalyzeArgs),

    /// Show artifact metadata
    Inspect(InspectArgs),
}

/// Arguments for corpus generation
#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    /// Number of transactions to generate
    #[arg(short, long, default_value = "5000")]
    pub rows: usize,

    /// Random seed
    #[arg(short, long, default_value = "42")]
    pub seed: u64,

    /// Output CSV file
    #[arg(short, long, value_name = "CSV_FILE", default_value = "data/transactions.csv")]
    pub output: PathBuf,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Labelled CSV with Description and Category columns
    #[arg(short, long, value_name = "CSV_FILE")]
    pub data: PathBuf,

    /// Where to write the artifact (default: artifact_path from the config)
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub output: Option<PathBuf>,

    /// Number of trees
    #[arg(long)]
    pub trees: Option<usize>,

    /// Vocabulary size cap
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Held-out fraction per category
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed for the split and the forest
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads for tree fitting
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// JSON configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

impl TrainArgs {
    /// Apply command line overrides on top of `config`.
    pub fn apply(&self, config: &mut AngelConfig) {
        if let Some(output) = &self.output {
            config.artifact_path = output.clone();
        }
        if let Some(trees) = self.trees {
            config.forest.n_estimators = trees;
        }
        if let Some(max_features) = self.max_features {
            config.vectorizer.max_features = Some(max_features);
        }
        if let Some(test_size) = self.test_size {
            config.training.test_fraction = test_size;
        }
        if let Some(seed) = self.seed {
            config.training.seed = seed;
            config.forest.seed = seed;
        }
        if let Some(jobs) = self.jobs {
            config.forest.n_jobs = Some(jobs);
        }
    }
}

/// Arguments for classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Trained artifact
    #[arg(short, long, value_name = "MODEL_FILE", env = "LOAN_ANGEL_MODEL")]
    pub model: Option<PathBuf>,

    /// Show the share of trees voting for each category
    #[arg(long)]
    pub explain: bool,

    /// Descriptions to classify
    #[arg(value_name = "DESCRIPTION", required = true, num_args = 1..)]
    pub descriptions: Vec<String>,
}

/// Arguments for analysis
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Trained artifact
    #[arg(short, long, value_name = "MODEL_FILE", env = "LOAN_ANGEL_MODEL")]
    pub model: Option<PathBuf>,

    /// JSON request file (stdin when omitted)
    #[arg(short, long, value_name = "REQUEST_FILE")]
    pub input: Option<PathBuf>,
}

/// Arguments for artifact inspection
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Trained artifact
    #[arg(short, long, value_name = "MODEL_FILE", env = "LOAN_ANGEL_MODEL")]
    pub model: Option<PathBuf>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
