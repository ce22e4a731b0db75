//! Stratified k-fold cross-validation for decision trees.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::confusion::ConfusionMatrix;
use crate::error::TreeError;
use crate::metrics::{accuracy, mean_squared_error};
use crate::tree::DecisionTreeConfig;

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Results of stratified k-fold cross-validation.
#[derive(Debug, Clone)]
pub struct CrossValidationResult {
    /// Accuracy for each fold.
    pub fold_accuracies: Vec<f64>,
    /// Mean accuracy across folds.
    pub mean_accuracy: f64,
    /// Standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Mean squared error over every held-out prediction.
    pub mean_squared_error: f64,
    /// Confusion matrix summed across all folds.
    pub confusion_matrix: ConfusionMatrix,
    /// Number of folds.
    pub n_folds: usize,
    /// Total number of samples.
    pub n_samples: usize,
    /// Number of features.
    pub n_features: usize,
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, TreeError> {
        if n_folds < 2 {
            return Err(TreeError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the random seed for fold assignment.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Run stratified k-fold cross-validation.
    ///
    /// Every fold fits a tree on copies of the remaining folds (the input
    /// is not reordered) and scores it on the held-out fold.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | Zero samples |
    /// | [`TreeError::ResponseLengthMismatch`] | `responses.len() != rows.len()` |
    /// | [`TreeError::TooFewSamplesForFolds`] | A class has fewer samples than folds |
    /// | Other tree errors | From fitting or prediction |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = rows.len()))]
    pub fn evaluate(
        &self,
        config: &DecisionTreeConfig,
        rows: &[Vec<f64>],
        responses: &[f64],
    ) -> Result<CrossValidationResult, TreeError> {
        if rows.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        if responses.len() != rows.len() {
            return Err(TreeError::ResponseLengthMismatch {
                n_samples: rows.len(),
                n_responses: responses.len(),
            });
        }

        let n_samples = rows.len();
        let n_features = rows[0].len();
        let fold_assignments = self.stratified_split(responses)?;

        let mut fold_accuracies = Vec::with_capacity(self.n_folds);
        let mut confusion_matrix = ConfusionMatrix::default();
        let mut held_out_truth = Vec::with_capacity(n_samples);
        let mut held_out_predicted = Vec::with_capacity(n_samples);

        for fold in 0..self.n_folds {
            let mut train_rows = Vec::new();
            let mut train_responses = Vec::new();
            let mut test_rows = Vec::new();
            let mut test_responses = Vec::new();

            for (i, &assigned_fold) in fold_assignments.iter().enumerate() {
                if assigned_fold == fold {
                    test_rows.push(rows[i].clone());
                    test_responses.push(responses[i]);
                } else {
                    train_rows.push(rows[i].clone());
                    train_responses.push(responses[i]);
                }
            }

            let tree = config.fit(&mut train_rows, &mut train_responses)?;
            let predictions = tree.predict_batch(&test_rows)?;

            let fold_accuracy = accuracy(&predictions, &test_responses)?;
            fold_accuracies.push(fold_accuracy);
            info!(fold, accuracy = fold_accuracy, n_nodes = tree.n_nodes(), "fold completed");

            confusion_matrix.record(&test_responses, &predictions);
            held_out_truth.extend_from_slice(&test_responses);
            held_out_predicted.extend_from_slice(&predictions);
        }

        let mean_accuracy = fold_accuracies.iter().sum::<f64>() / self.n_folds as f64;
        let std_accuracy = {
            let variance = fold_accuracies
                .iter()
                .map(|&a| (a - mean_accuracy).powi(2))
                .sum::<f64>()
                / self.n_folds as f64;
            variance.sqrt()
        };
        let mean_squared_error = mean_squared_error(&held_out_predicted, &held_out_truth)?;

        info!(
            mean_accuracy,
            std_accuracy,
            mean_squared_error,
            "cross-validation complete"
        );

        Ok(CrossValidationResult {
            fold_accuracies,
            mean_accuracy,
            std_accuracy,
            mean_squared_error,
            confusion_matrix,
            n_folds: self.n_folds,
            n_samples,
            n_features,
        })
    }

    /// Create stratified fold assignments.
    ///
    /// Groups samples by label, shuffles within each group, then
    /// round-robins across folds so each fold gets approximately
    /// equal representation of both labels.
    fn stratified_split(&self, responses: &[f64]) -> Result<Vec<usize>, TreeError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut class_indices: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (i, &y) in responses.iter().enumerate() {
            class_indices[usize::from(y == 1.0)].push(i);
        }

        for (class, indices) in class_indices.iter().enumerate() {
            if !indices.is_empty() && indices.len() < self.n_folds {
                return Err(TreeError::TooFewSamplesForFolds {
                    class,
                    count: indices.len(),
                    n_folds: self.n_folds,
                });
            }
        }

        let mut fold_assignments = vec![0usize; responses.len()];
        for indices in &mut class_indices {
            indices.shuffle(&mut rng);
            for (j, &idx) in indices.iter().enumerate() {
                fold_assignments[idx] = j % self.n_folds;
            }
        }

        Ok(fold_assignments)
    }
}
