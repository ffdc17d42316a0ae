//! Command implementations for the loan-angel CLI.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::classifier::{CategoryClassifier, ClassificationService};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::AngelConfig;
use crate::datagen;
use crate::error::{AngelError, Result};
use crate::finance::analyzer::FinancialAnalyzer;
use crate::finance::transaction::{AnalysisResponse, AnalyzeRequest, PredictRequest};
use crate::training::dataset::load_labeled_csv;
use crate::training::pipeline::TrainingPipeline;

/// Execute a CLI command.
pub fn execute_command(args: AngelArgs) -> Result<()> {
    match &args.command {
        Command::Generate(generate_args) => generate_corpus(generate_args, &args),
        Command::Train(train_args) => train_model(train_args, &args),
        Command::Classify(classify_args) => classify_descriptions(classify_args, &args),
        Command::Analyze(analyze_args) => analyze_transactions(analyze_args, &args),
        Command::Inspect(inspect_args) => inspect_artifact(inspect_args, &args),
    }
}

fn model_path(model: Option<&Path>) -> PathBuf {
    model
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AngelConfig::default().artifact_path)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write a synthetic corpus.
fn generate_corpus(args: &GenerateArgs, cli_args: &AngelArgs) -> Result<()> {
    ensure_parent_dir(&args.output)?;
    let rows = datagen::generate_to_file(args.rows, args.seed, &args.output)?;

    let mut categories = BTreeMap::new();
    for row in &rows {
        *categories.entry(row.category.clone()).or_insert(0) += 1;
    }

    output_result(
        "Corpus generated",
        &GenerationSummary {
            path: args.output.display().to_string(),
            rows: rows.len(),
            categories,
        },
        cli_args,
    )
}

/// Train a classifier and write the artifact.
fn train_model(args: &TrainArgs, cli_args: &AngelArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AngelConfig::from_file(path)?,
        None => AngelConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let pipeline = TrainingPipeline::from_config(&config)?;
    let rows = load_labeled_csv(&args.data)?;

    ensure_parent_dir(&config.artifact_path)?;
    let outcome = pipeline.run(&rows, &config.artifact_path)?;
    let metadata = outcome.artifact.metadata();

    output_result(
        "Training completed",
        &TrainingSummary {
            artifact_path: config.artifact_path.display().to_string(),
            artifact_id: metadata.id.to_string(),
            n_train: metadata.n_train,
            n_test: metadata.n_test,
            labels: metadata.labels.clone(),
            vocabulary_size: metadata.vocabulary_size,
            report: outcome.report.clone(),
        },
        cli_args,
    )
}

/// Classify one or more descriptions.
fn classify_descriptions(args: &ClassifyArgs, cli_args: &AngelArgs) -> Result<()> {
    let service = ClassificationService::from_path(model_path(args.model.as_deref()));

    let mut predictions = Vec::with_capacity(args.descriptions.len());
    for description in &args.descriptions {
        let request = PredictRequest {
            description: description.clone(),
        };
        request.validate()?;

        let category = service.classify(&request.description)?;
        let votes = if args.explain {
            Some(
                service
                    .explain(&request.description)?
                    .into_iter()
                    .map(|(category, share)| Vote { category, share })
                    .collect(),
            )
        } else {
            None
        };
        predictions.push(Prediction {
            description: request.description,
            category,
            votes,
        });
    }

    output_result("Classification", &Predictions(predictions), cli_args)
}

fn read_request(input: Option<&Path>) -> Result<AnalyzeRequest> {
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    serde_json::from_str(&text)
        .map_err(|e| AngelError::invalid_input(format!("invalid request JSON: {e}")))
}

/// Analyze a batch of transactions and print the summary with advice.
fn analyze_transactions(args: &AnalyzeArgs, cli_args: &AngelArgs) -> Result<()> {
    let request = read_request(args.input.as_deref())?;
    request.validate()?;

    let service = ClassificationService::from_path(model_path(args.model.as_deref()));
    let analyzer = FinancialAnalyzer::new(&service);
    let result = analyzer.analyze(&request.transactions)?;
    let advice = result.advise()?;

    output_result(
        "Analysis",
        &AnalysisResponse::new(result, &advice),
        cli_args,
    )
}

/// Print artifact metadata.
fn inspect_artifact(args: &InspectArgs, cli_args: &AngelArgs) -> Result<()> {
    let service = ClassificationService::from_path(model_path(args.model.as_deref()));
    let metadata = service.metadata()?;
    output_result("Artifact", metadata, cli_args)
}
