//! Random Forest Ensembles
//!
//! The classifier grows each tree on a bootstrap sample restricted to a
//! random subset of `ceil(sqrt(features))` columns. The regressor is
//! smartcore's random forest considering every feature at each split.

use crate::InferenceError;
use ndarray::Array2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use std::collections::HashMap;
use tracing::debug;

type TreeClassifier = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;
type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Ensemble configuration shared by the classifier and the regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees per ensemble
    pub n_trees: usize,
    /// Seed for bootstrap and feature sampling
    pub seed: u64,
    /// Draw classifier bootstrap samples with inverse class frequency weights
    pub balanced_class_weight: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 50,
            seed: 42,
            balanced_class_weight: true,
        }
    }
}

/// A bootstrap sample holding a single class cannot grow a tree; it votes
/// for that class unconditionally.
enum ClassifierTree {
    Fitted {
        tree: TreeClassifier,
        features: Vec<usize>,
    },
    Constant(i32),
}

impl ClassifierTree {
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<i32>, InferenceError> {
        match self {
            ClassifierTree::Fitted { tree, features } => {
                let all_rows: Vec<usize> = (0..x.nrows()).collect();
                tree.predict(&dense_subset(x, &all_rows, features))
                    .map_err(|e| InferenceError::InferenceFailed(e.to_string()))
            }
            ClassifierTree::Constant(label) => Ok(vec![*label; x.nrows()]),
        }
    }
}

/// Binary classifier: the positive-class probability is the share of trees
/// voting for class 1.
pub struct ForestClassifier {
    trees: Vec<ClassifierTree>,
    n_features: usize,
}

impl ForestClassifier {
    /// Fit on a (rows × features) matrix and 0/1 labels
    pub fn fit(x: &Array2<f64>, labels: &[f64], config: &ForestConfig) -> Result<Self, InferenceError> {
        validate_training_input(x, labels)?;
        let y = labels
            .iter()
            .map(|&label| match label {
                l if l == 0.0 => Ok(0),
                l if l == 1.0 => Ok(1),
                other => Err(InferenceError::InvalidLabel(other)),
            })
            .collect::<Result<Vec<i32>, _>>()?;

        let mut trees = Vec::with_capacity(config.n_trees);
        for t in 0..config.n_trees {
            let mut rng = tree_rng(config.seed, t);
            let sample = if config.balanced_class_weight {
                balanced_bootstrap(&mut rng, &y)?
            } else {
                bootstrap(&mut rng, y.len())
            };

            let features = feature_subset(&mut rng, x.ncols());

            let ys: Vec<i32> = sample.iter().map(|&i| y[i]).collect();
            let tree = match ys.first() {
                Some(&first) if ys.iter().all(|&label| label == first) => ClassifierTree::Constant(first),
                _ => {
                    let xs = dense_subset(x, &sample, &features);
                    let tree = TreeClassifier::fit(&xs, &ys, DecisionTreeClassifierParameters::default())
                        .map_err(|e| InferenceError::TrainingFailed(e.to_string()))?;
                    ClassifierTree::Fitted { tree, features }
                }
            };
            trees.push(tree);
        }

        debug!("Fitted classifier with {} trees", trees.len());
        Ok(Self {
            trees,
            n_features: x.ncols(),
        })
    }

    /// Probability of class 1 for every row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        check_width(x, self.n_features)?;
        let mut votes = vec![0usize; x.nrows()];

        for tree in &self.trees {
            let predicted = tree.predict(x)?;
            for (vote, label) in votes.iter_mut().zip(predicted) {
                if label == 1 {
                    *vote += 1;
                }
            }
        }

        let n_trees = self.trees.len().max(1) as f64;
        Ok(votes.into_iter().map(|v| v as f64 / n_trees).collect())
    }

    /// Number of trees in the ensemble
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Regressor: the prediction is the mean of the tree predictions
pub struct ForestRegressor {
    forest: ForestModel,
    n_trees: usize,
    n_features: usize,
}

impl ForestRegressor {
    /// Fit on a (rows × features) matrix and continuous targets
    pub fn fit(x: &Array2<f64>, targets: &[f64], config: &ForestConfig) -> Result<Self, InferenceError> {
        validate_training_input(x, targets)?;
        if targets.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::NonFiniteInput("regression target".to_string()));
        }

        let params = RandomForestRegressorParameters::default()
            .with_n_trees(config.n_trees)
            .with_m(x.ncols())
            .with_seed(config.seed);
        let forest = ForestModel::fit(&dense_all(x), &targets.to_vec(), params)
            .map_err(|e| InferenceError::TrainingFailed(e.to_string()))?;

        debug!("Fitted regressor with {} trees", config.n_trees);
        Ok(Self {
            forest,
            n_trees: config.n_trees,
            n_features: x.ncols(),
        })
    }

    /// Mean tree prediction for every row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        check_width(x, self.n_features)?;
        self.forest
            .predict(&dense_all(x))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))
    }

    /// Number of trees in the ensemble
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }
}

fn validate_training_input(x: &Array2<f64>, y: &[f64]) -> Result<(), InferenceError> {
    if x.nrows() == 0 {
        return Err(InferenceError::EmptyTrainingSet);
    }
    if x.ncols() == 0 {
        return Err(InferenceError::NoFeatures);
    }
    if x.nrows() != y.len() {
        return Err(InferenceError::InvalidInputShape {
            expected: format!("{} targets", x.nrows()),
            actual: format!("{} targets", y.len()),
        });
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(InferenceError::NonFiniteInput("feature matrix".to_string()));
    }
    Ok(())
}

fn check_width(x: &Array2<f64>, n_features: usize) -> Result<(), InferenceError> {
    if x.ncols() != n_features {
        return Err(InferenceError::InvalidInputShape {
            expected: format!("{} features", n_features),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}

/// Each tree draws from its own stream so results do not depend on tree order
fn tree_rng(seed: u64, tree: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(tree as u64))
}

/// Uniform sampling of `n` rows with replacement
fn bootstrap(rng: &mut StdRng, n: usize) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Sampling with replacement where each class carries equal total weight
fn balanced_bootstrap(rng: &mut StdRng, labels: &[i32]) -> Result<Vec<usize>, InferenceError> {
    let mut class_counts: HashMap<i32, usize> = HashMap::new();
    for &label in labels {
        *class_counts.entry(label).or_insert(0) += 1;
    }

    let n = labels.len() as f64;
    let k = class_counts.len() as f64;
    let weights: Vec<f64> = labels
        .iter()
        .map(|label| n / (k * class_counts[label] as f64))
        .collect();

    let dist = WeightedIndex::new(&weights)
        .map_err(|e| InferenceError::TrainingFailed(e.to_string()))?;
    Ok((0..labels.len()).map(|_| dist.sample(rng)).collect())
}

/// Sorted random subset of `ceil(sqrt(n_features))` column indices
fn feature_subset(rng: &mut StdRng, n_features: usize) -> Vec<usize> {
    let k = ((n_features as f64).sqrt().ceil() as usize).clamp(1, n_features);
    let mut features = rand::seq::index::sample(rng, n_features, k).into_vec();
    features.sort_unstable();
    features
}

fn dense_subset(x: &Array2<f64>, rows: &[usize], features: &[usize]) -> DenseMatrix<f64> {
    let mut data = Vec::with_capacity(rows.len() * features.len());
    for &r in rows {
        data.extend(features.iter().map(|&c| x[[r, c]]));
    }
    DenseMatrix::new(rows.len(), features.len(), data, false)
}

fn dense_all(x: &Array2<f64>) -> DenseMatrix<f64> {
    let data: Vec<f64> = x.iter().copied().collect();
    DenseMatrix::new(x.nrows(), x.ncols(), data, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Vec<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(r, c)| if c == 0 { r as f64 } else { (r % 3) as f64 });
        let y = (0..40).map(|r| if r >= 30 { 1.0 } else { 0.0 }).collect();
        (x, y)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 15,
            ..Default::default()
        }
    }

    #[test]
    fn test_classifier_separates_extremes() {
        let (x, y) = separable();
        let forest = ForestClassifier::fit(&x, &y, &small_config()).unwrap();
        assert_eq!(forest.n_trees(), 15);

        let proba = forest.predict_proba(&array![[0.0, 0.0], [39.0, 0.0]]).unwrap();
        assert!(proba[0] < 0.5);
        assert!(proba[1] > 0.5);
    }

    #[test]
    fn test_classifier_is_deterministic() {
        let (x, y) = separable();
        let a = ForestClassifier::fit(&x, &y, &small_config()).unwrap();
        let b = ForestClassifier::fit(&x, &y, &small_config()).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_regressor_tracks_target() {
        let (x, _) = separable();
        let targets: Vec<f64> = (0..40).map(|r| 400.0 - 10.0 * r as f64).collect();
        let forest = ForestRegressor::fit(&x, &targets, &small_config()).unwrap();

        let predicted = forest.predict(&array![[1.0, 1.0], [38.0, 2.0]]).unwrap();
        assert!(predicted[0] > predicted[1]);
        assert!(predicted[0] <= 400.0 && predicted[1] >= 10.0);
    }

    #[test]
    fn test_single_class_training_set() {
        let (x, _) = separable();
        let forest = ForestClassifier::fit(&x, &[0.0; 40], &small_config()).unwrap();
        let proba = forest.predict_proba(&array![[5.0, 1.0], [39.0, 0.0]]).unwrap();
        assert_eq!(proba, vec![0.0, 0.0]);
    }

    #[test]
    fn test_invalid_label() {
        let x = array![[1.0], [2.0]];
        let result = ForestClassifier::fit(&x, &[0.0, 2.0], &small_config());
        assert!(matches!(result, Err(InferenceError::InvalidLabel(v)) if v == 2.0));
    }

    #[test]
    fn test_non_finite_features_rejected() {
        let x = array![[1.0], [f64::NAN]];
        let result = ForestRegressor::fit(&x, &[1.0, 2.0], &small_config());
        assert!(matches!(result, Err(InferenceError::NonFiniteInput(_))));
    }

    #[test]
    fn test_empty_training_set() {
        let x = Array2::<f64>::zeros((0, 3));
        let result = ForestRegressor::fit(&x, &[], &small_config());
        assert!(matches!(result, Err(InferenceError::EmptyTrainingSet)));
    }

    #[test]
    fn test_width_mismatch() {
        let (x, y) = separable();
        let forest = ForestClassifier::fit(&x, &y, &small_config()).unwrap();
        let result = forest.predict_proba(&array![[1.0, 2.0, 3.0]]);
        assert!(matches!(result, Err(InferenceError::InvalidInputShape { .. })));
    }

    #[test]
    fn test_feature_subset_size() {
        let mut rng = tree_rng(42, 0);
        for (p, k) in [(1, 1), (2, 2), (4, 2), (9, 3), (10, 4)] {
            let features = feature_subset(&mut rng, p);
            assert_eq!(features.len(), k);
            assert!(features.windows(2).all(|w| w[0] < w[1]));
            assert!(features.iter().all(|&c| c < p));
        }
    }

    #[test]
    fn test_feature_sampling_softens_dominant_feature() {
        // Column 0 alone separates the classes; the rest is structured noise
        let rows = 60;
        let x = Array2::from_shape_fn((rows, 9), |(r, c)| {
            if c == 0 {
                r as f64
            } else {
                ((r * 37 + c * 11) % 17) as f64
            }
        });
        let y: Vec<f64> = (0..rows).map(|r| if r >= rows / 2 { 1.0 } else { 0.0 }).collect();

        let labels: Vec<i32> = y.iter().map(|&v| v as i32).collect();
        let single = TreeClassifier::fit(&dense_all(&x), &labels, DecisionTreeClassifierParameters::default()).unwrap();
        let single_votes = single.predict(&dense_all(&x)).unwrap();
        assert_eq!(single_votes, labels);

        let forest = ForestClassifier::fit(&x, &y, &ForestConfig::default()).unwrap();
        let proba = forest.predict_proba(&x).unwrap();
        // Trees that never see column 0 disagree with the single tree's hard votes
        assert!(
            proba.iter().any(|&p| p > 0.0 && p < 1.0),
            "probabilities = {:?}",
            proba
        );
        let mean = |range: std::ops::Range<usize>| proba[range.clone()].iter().sum::<f64>() / range.len() as f64;
        assert!(mean(0..rows / 2) < mean(rows / 2..rows));
    }

    #[test]
    fn test_regressor_is_deterministic() {
        let (x, _) = separable();
        let targets: Vec<f64> = (0..40).map(|r| (r % 7) as f64 * 3.0).collect();
        let a = ForestRegressor::fit(&x, &targets, &small_config()).unwrap();
        let b = ForestRegressor::fit(&x, &targets, &small_config()).unwrap();
        assert_eq!(a.n_trees(), 15);
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_balanced_bootstrap_evens_out_classes() {
        let labels: Vec<i32> = (0..200).map(|i| if i < 10 { 1 } else { 0 }).collect();
        let mut rng = tree_rng(42, 0);
        let sample = balanced_bootstrap(&mut rng, &labels).unwrap();

        let positives = sample.iter().filter(|&&i| labels[i] == 1).count();
        // Expected share is one half; the uniform share would be 5%
        assert!(positives > 60 && positives < 140, "positives = {}", positives);
    }
}
