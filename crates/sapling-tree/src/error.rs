/// Errors from decision tree fitting, prediction, and evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than the first row.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when the response vector and feature matrix disagree on length.
    #[error("feature matrix has {n_samples} rows but response vector has {n_responses} entries")]
    ResponseLengthMismatch {
        /// Number of rows in the feature matrix.
        n_samples: usize,
        /// Number of entries in the response vector.
        n_responses: usize,
    },

    /// Returned when a response is anything other than exactly 0.0 or 1.0.
    #[error("response at sample {sample_index} is {value}, expected 0 or 1")]
    NonBinaryResponse {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The value found.
        value: f64,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The number of features the tree was fitted on.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when predicted and true label vectors differ in length.
    #[error("predicted labels have length {predicted}, true labels have length {truth}")]
    LengthMismatch {
        /// Number of predicted labels.
        predicted: usize,
        /// Number of true labels.
        truth: usize,
    },

    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid n_folds value provided.
        n_folds: usize,
    },

    /// Returned when a class has fewer samples than the number of folds.
    #[error("class {class} has only {count} samples, need at least {n_folds} for stratified CV")]
    TooFewSamplesForFolds {
        /// The class label with insufficient samples.
        class: usize,
        /// The number of samples belonging to that class.
        count: usize,
        /// The requested number of folds.
        n_folds: usize,
    },
}

impl TreeError {
    /// Return `true` for errors caused by malformed training data.
    ///
    /// These are raised by [`DecisionTreeConfig::fit`](crate::DecisionTreeConfig::fit)
    /// before any recursion starts; fixing the input and refitting is the
    /// only recovery.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            TreeError::EmptyDataset
                | TreeError::ZeroFeatures
                | TreeError::FeatureCountMismatch { .. }
                | TreeError::ResponseLengthMismatch { .. }
                | TreeError::NonBinaryResponse { .. }
                | TreeError::NonFiniteValue { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::TreeError;

    #[test]
    fn input_errors_are_classified() {
        assert!(TreeError::EmptyDataset.is_invalid_input());
        assert!(
            TreeError::NonBinaryResponse {
                sample_index: 3,
                value: 2.0
            }
            .is_invalid_input()
        );
        assert!(
            !TreeError::PredictionFeatureMismatch {
                expected: 2,
                got: 3
            }
            .is_invalid_input()
        );
        assert!(!TreeError::InvalidFoldCount { n_folds: 1 }.is_invalid_input());
    }

    #[test]
    fn messages_carry_context() {
        let err = TreeError::ResponseLengthMismatch {
            n_samples: 4,
            n_responses: 3,
        };
        assert_eq!(
            err.to_string(),
            "feature matrix has 4 rows but response vector has 3 entries"
        );
    }
}
