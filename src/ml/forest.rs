//! Random forest classifier: bagged CART trees with majority voting.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AngelError, Result};
use crate::ml::labels::LabelEncoder;
use crate::ml::matrix::FeatureMatrix;
use crate::ml::sparse::SparseVector;
use crate::ml::tree::{DecisionTreeClassifier, TreeConfig, majority_class};

/// Configuration for [`RandomForestClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_estimators: usize,

    /// Draw a bootstrap sample per tree. When false every tree sees all rows
    /// and only the feature sampling differs.
    pub bootstrap: bool,

    /// Seed for bootstrap sampling and feature draws.
    pub seed: u64,

    /// Worker threads used while fitting. `None` uses every core.
    pub n_jobs: Option<usize>,

    /// Growth limits shared by all trees.
    pub tree: TreeConfig,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            bootstrap: true,
            seed: 42,
            n_jobs: None,
            tree: TreeConfig::default(),
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(AngelError::invalid_config("n_estimators must be at least 1"));
        }
        if self.n_jobs == Some(0) {
            return Err(AngelError::invalid_config("n_jobs must be at least 1"));
        }
        self.tree.validate()
    }

    fn threads(&self) -> usize {
        self.n_jobs.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Ensemble of decision trees voting on a category label.
///
/// Each tree gets its own RNG seeded from the master seed before any tree is
/// grown, so the fitted forest is the same whether trees are grown on one
/// thread or many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    labels: LabelEncoder,
    trees: Vec<DecisionTreeClassifier>,
    n_features: usize,
    config: ForestConfig,
}

impl RandomForestClassifier {
    /// Fit a forest on feature vectors and their labels.
    pub fn fit<S: AsRef<str>>(
        config: ForestConfig,
        vectors: &[SparseVector],
        labels: &[S],
    ) -> Result<Self> {
        config.validate()?;
        if vectors.is_empty() {
            return Err(AngelError::model("cannot fit a forest on zero rows"));
        }
        if vectors.len() != labels.len() {
            return Err(AngelError::model(format!(
                "{} feature rows but {} labels",
                vectors.len(),
                labels.len()
            )));
        }

        let n_features = vectors[0].dimension();
        if vectors.iter().any(|v| v.dimension() != n_features) {
            return Err(AngelError::model("feature rows differ in dimension"));
        }

        let encoder = LabelEncoder::fit(labels);
        let encoded = labels
            .iter()
            .map(|l| {
                encoder
                    .encode(l.as_ref())
                    .ok_or_else(|| AngelError::model(format!("unknown label {}", l.as_ref())))
            })
            .collect::<Result<Vec<u32>>>()?;

        let matrix = FeatureMatrix::from_sparse(vectors, n_features);
        let n_rows = vectors.len();
        let n_classes = encoder.len();

        let mut master = StdRng::seed_from_u64(config.seed);
        let seeds: Vec<u64> = (0..config.n_estimators).map(|_| master.random()).collect();

        log::info!(
            "growing {} trees on {} rows x {} features ({} classes, {} threads)",
            config.n_estimators,
            n_rows,
            n_features,
            n_classes,
            config.threads()
        );

        let grow = |seed: &u64| -> Result<DecisionTreeClassifier> {
            let mut rng = StdRng::seed_from_u64(*seed);
            let samples: Vec<usize> = if config.bootstrap {
                (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect()
            } else {
                (0..n_rows).collect()
            };
            DecisionTreeClassifier::fit(&matrix, &encoded, n_classes, &samples, &config.tree, &mut rng)
        };

        let trees = if config.threads() == 1 {
            seeds.iter().map(grow).collect::<Result<Vec<_>>>()?
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads())
                .build()
                .map_err(|e| AngelError::other(format!("failed to start thread pool: {e}")))?;
            pool.install(|| seeds.par_iter().map(grow).collect::<Result<Vec<_>>>())?
        };

        log::debug!(
            "forest grown: {} nodes in total",
            trees.iter().map(|t| t.node_count()).sum::<usize>()
        );

        Ok(Self {
            labels: encoder,
            trees,
            n_features,
            config,
        })
    }

    /// Majority vote across trees. Ties go to the lexicographically smallest
    /// label.
    pub fn predict(&self, features: &SparseVector) -> Result<&str> {
        let votes = self.vote_counts(features)?;
        let class = majority_class(&votes);
        self.labels
            .decode(class)
            .ok_or_else(|| AngelError::model(format!("class index {class} has no label")))
    }

    /// Fraction of trees voting for each label, in label order.
    pub fn predict_votes(&self, features: &SparseVector) -> Result<Vec<(String, f64)>> {
        let votes = self.vote_counts(features)?;
        let n_trees = self.trees.len() as f64;
        Ok(self
            .labels
            .classes()
            .iter()
            .zip(votes)
            .map(|(label, count)| (label.clone(), count as f64 / n_trees))
            .collect())
    }

    fn vote_counts(&self, features: &SparseVector) -> Result<Vec<usize>> {
        if features.dimension() != self.n_features {
            return Err(AngelError::model(format!(
                "expected {} features, got {}",
                self.n_features,
                features.dimension()
            )));
        }
        let mut votes = vec![0usize; self.labels.len()];
        for tree in &self.trees {
            votes[tree.predict(features) as usize] += 1;
        }
        Ok(votes)
    }

    /// The closed label set, in class-index order.
    pub fn labels(&self) -> &[String] {
        self.labels.classes()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Structural checks run after loading from disk.
    pub(crate) fn check_consistency(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(AngelError::serialization("forest has no trees"));
        }
        if self.labels.is_empty() {
            return Err(AngelError::serialization("forest has no labels"));
        }
        for tree in &self.trees {
            if tree.n_classes() != self.labels.len() {
                return Err(AngelError::serialization(
                    "tree class count differs from label set",
                ));
            }
            tree.check_consistency(self.labels.len(), self.n_features)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Vec<SparseVector>, Vec<&'static str>) {
        let mut vectors = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = i as f64 * 0.001;
            vectors.push(SparseVector::from_pairs(3, vec![(0, 1.0 + jitter)]));
            labels.push("Food");
            vectors.push(SparseVector::from_pairs(3, vec![(1, 1.0 + jitter)]));
            labels.push("Rent");
            vectors.push(SparseVector::from_pairs(3, vec![(2, 1.0 + jitter)]));
            labels.push("Salary");
        }
        (vectors, labels)
    }

    fn small_config(n_jobs: Option<usize>) -> ForestConfig {
        ForestConfig {
            n_estimators: 15,
            n_jobs,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_forest_learns_simple_mapping() {
        let (vectors, labels) = data();
        let forest = RandomForestClassifier::fit(small_config(Some(1)), &vectors, &labels).unwrap();

        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.labels(), &["Food", "Rent", "Salary"]);
        assert_eq!(
            forest.predict(&SparseVector::from_pairs(3, vec![(0, 1.0)])).unwrap(),
            "Food"
        );
        assert_eq!(
            forest.predict(&SparseVector::from_pairs(3, vec![(1, 1.0)])).unwrap(),
            "Rent"
        );
        assert_eq!(
            forest.predict(&SparseVector::from_pairs(3, vec![(2, 1.0)])).unwrap(),
            "Salary"
        );
    }

    #[test]
    fn test_same_seed_same_forest_regardless_of_threads() {
        let (vectors, labels) = data();
        let sequential = RandomForestClassifier::fit(small_config(Some(1)), &vectors, &labels).unwrap();
        let parallel = RandomForestClassifier::fit(small_config(Some(4)), &vectors, &labels).unwrap();
        assert_eq!(sequential.trees, parallel.trees);
    }

    #[test]
    fn test_votes_sum_to_one() {
        let (vectors, labels) = data();
        let forest = RandomForestClassifier::fit(small_config(Some(2)), &vectors, &labels).unwrap();
        let votes = forest
            .predict_votes(&SparseVector::from_pairs(3, vec![(1, 1.0)]))
            .unwrap();
        assert_eq!(votes.len(), 3);
        let total: f64 = votes.iter().map(|(_, v)| v).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_input() {
        let (vectors, labels) = data();
        assert!(RandomForestClassifier::fit(small_config(Some(1)), &[], &labels[..0]).is_err());
        assert!(RandomForestClassifier::fit(small_config(Some(1)), &vectors, &labels[..3]).is_err());

        let config = ForestConfig {
            n_estimators: 0,
            ..ForestConfig::default()
        };
        assert!(matches!(
            RandomForestClassifier::fit(config, &vectors, &labels),
            Err(AngelError::InvalidConfig(_))
        ));

        let forest = RandomForestClassifier::fit(small_config(Some(1)), &vectors, &labels).unwrap();
        assert!(forest.predict(&SparseVector::zeros(7)).is_err());
    }
}
