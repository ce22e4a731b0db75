//! Binary confusion matrix and derived classification metrics.

use std::fmt;

use crate::error::TreeError;

/// A 2×2 confusion matrix over 0/1 labels.
///
/// Entry `[true_class][predicted_class]` counts how many samples with true
/// label `true_class` were predicted as `predicted_class`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    matrix: [[usize; 2]; 2],
}

/// Precision, recall, and F1 score for the positive class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryMetrics {
    /// Precision: TP / (TP + FP). 0.0 if nothing was predicted positive.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if there are no positive samples.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of positive samples.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// Any label other than 1.0 counts as the negative class.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::LengthMismatch`] | Slices differ in length |
    /// | [`TreeError::EmptyDataset`] | Zero labels provided |
    pub fn from_labels(truth: &[f64], predicted: &[f64]) -> Result<Self, TreeError> {
        if truth.len() != predicted.len() {
            return Err(TreeError::LengthMismatch {
                predicted: predicted.len(),
                truth: truth.len(),
            });
        }
        if truth.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        let mut cm = Self::default();
        cm.record(truth, predicted);
        Ok(cm)
    }

    /// Add further label pairs to the counts.
    pub fn record(&mut self, truth: &[f64], predicted: &[f64]) {
        for (&t, &p) in truth.iter().zip(predicted) {
            self.matrix[usize::from(t == 1.0)][usize::from(p == 1.0)] += 1;
        }
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.matrix[0][0] + self.matrix[1][1]) as f64 / total as f64
        }
    }

    /// Precision, recall, F1, and support for the positive class.
    #[must_use]
    pub fn positive_metrics(&self) -> BinaryMetrics {
        let tp = self.matrix[1][1];
        let fp = self.matrix[0][1];
        let fn_ = self.matrix[1][0];
        let support = tp + fn_;
        let precision = if tp + fp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fp) as f64
        };
        let recall = if support == 0 {
            0.0
        } else {
            tp as f64 / support as f64
        };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        BinaryMetrics {
            precision,
            recall,
            f1,
            support,
        }
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        self.matrix
    }

    /// Return the total number of recorded samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} {:>8} {:>8}", "", "pred 0", "pred 1")?;
        for (class, row) in self.matrix.iter().enumerate() {
            writeln!(f, "{:>10} {:>8} {:>8}", format!("true {class}"), row[0], row[1])?;
        }
        Ok(())
    }
}
