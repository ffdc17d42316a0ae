use std::fs;

use loan_angel::artifact::{FORMAT_VERSION, TrainedArtifact};
use loan_angel::classifier::{CategoryClassifier, ClassificationService};
use loan_angel::datagen::CorpusGenerator;
use loan_angel::error::{AngelError, ArtifactError};
use loan_angel::ml::{ForestConfig, TfIdfConfig};
use loan_angel::training::pipeline::TrainingConfig;
use loan_angel::training::{LabeledRow, TrainingPipeline};

use tempfile::tempdir;

fn trained() -> TrainedArtifact {
    let rows: Vec<LabeledRow> = CorpusGenerator::new(11)
        .generate(400)
        .iter()
        .map(LabeledRow::from)
        .collect();
    let forest = ForestConfig {
        n_estimators: 8,
        n_jobs: Some(1),
        ..ForestConfig::default()
    };
    TrainingPipeline::new(TrainingConfig::default(), TfIdfConfig::default(), forest)
        .unwrap()
        .fit(&rows)
        .unwrap()
        .artifact
}

#[test]
fn test_round_trip_preserves_predictions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.bin");
    let artifact = trained();
    artifact.save(&path).unwrap();

    let loaded = TrainedArtifact::load(&path).unwrap();
    assert_eq!(loaded.metadata(), artifact.metadata());
    assert_eq!(loaded.to_bytes().unwrap(), artifact.to_bytes().unwrap());
    for tx in CorpusGenerator::new(3).generate(50) {
        assert_eq!(
            loaded.predict(&tx.description).unwrap(),
            artifact.predict(&tx.description).unwrap()
        );
    }
}

#[test]
fn test_missing_artifact_fails_every_call() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.bin");
    let service = ClassificationService::from_path(&path);

    assert!(matches!(
        service.classify("UPI/SWIGGY"),
        Err(AngelError::Artifact(ArtifactError::Missing { .. }))
    ));

    // Appearing later does not help: the failure is cached.
    trained().save(&path).unwrap();
    assert!(matches!(
        service.classify("UPI/SWIGGY"),
        Err(AngelError::Artifact(ArtifactError::Missing { .. }))
    ));

    let fresh = ClassificationService::from_path(&path);
    assert!(fresh.classify("UPI/SWIGGY").is_ok());
}

#[test]
fn test_corrupted_artifact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.bin");
    trained().save(&path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x55;
    fs::write(&path, &bytes).unwrap();

    let service = ClassificationService::from_path(&path);
    let err = service.classify("NETFLIX SUB").unwrap_err();
    assert!(matches!(
        err,
        AngelError::Artifact(ArtifactError::Corrupt { .. })
    ));
}

#[test]
fn test_truncated_artifact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.bin");
    trained().save(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();

    assert!(matches!(
        TrainedArtifact::load(&path),
        Err(ArtifactError::Corrupt { .. })
    ));
}

#[test]
fn test_future_format_version() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.bin");
    let mut bytes = trained().to_bytes().unwrap();
    bytes[4..8].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    match TrainedArtifact::load(&path) {
        Err(ArtifactError::UnsupportedVersion { found, expected, .. }) => {
            assert_eq!(found, FORMAT_VERSION + 1);
            assert_eq!(expected, FORMAT_VERSION);
        }
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn test_not_an_artifact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.bin");
    fs::write(&path, "Date,Description,Amount,Category\n").unwrap();
    assert!(matches!(
        TrainedArtifact::load(&path),
        Err(ArtifactError::Corrupt { .. })
    ));
}
