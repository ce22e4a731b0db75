//! Scalar scores for 0/1 predictions.

use crate::error::TreeError;

fn check_lengths(predicted: &[f64], truth: &[f64]) -> Result<(), TreeError> {
    if predicted.len() != truth.len() {
        return Err(TreeError::LengthMismatch {
            predicted: predicted.len(),
            truth: truth.len(),
        });
    }
    if truth.is_empty() {
        return Err(TreeError::EmptyDataset);
    }
    Ok(())
}

/// Fraction of predictions exactly equal to the true label.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::LengthMismatch`] | Slices differ in length |
/// | [`TreeError::EmptyDataset`] | Both slices are empty |
pub fn accuracy(predicted: &[f64], truth: &[f64]) -> Result<f64, TreeError> {
    check_lengths(predicted, truth)?;
    let correct = predicted
        .iter()
        .zip(truth)
        .filter(|&(p, t)| p == t)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Mean of squared differences between predictions and true labels.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::LengthMismatch`] | Slices differ in length |
/// | [`TreeError::EmptyDataset`] | Both slices are empty |
pub fn mean_squared_error(predicted: &[f64], truth: &[f64]) -> Result<f64, TreeError> {
    check_lengths(predicted, truth)?;
    let total: f64 = predicted
        .iter()
        .zip(truth)
        .map(|(p, t)| (p - t).powi(2))
        .sum();
    Ok(total / truth.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_counts_matches() {
        let acc = accuracy(&[0.0, 0.0, 1.0, 1.0, 1.0], &[0.0, 1.0, 0.0, 1.0, 1.0]).unwrap();
        assert!((acc - 0.6).abs() < 1e-12);
    }

    #[test]
    fn mse_of_labels_is_error_rate() {
        let mse = mean_squared_error(&[0.0, 1.0, 1.0, 0.0], &[0.0, 1.0, 0.0, 1.0]).unwrap();
        assert!((mse - 0.5).abs() < 1e-12);
    }

    #[test]
    fn mse_with_probabilities() {
        let mse = mean_squared_error(&[0.5, 0.25], &[1.0, 0.0]).unwrap();
        assert!((mse - (0.25 + 0.0625) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        assert_eq!(
            accuracy(&[0.0], &[0.0, 1.0]).unwrap_err(),
            TreeError::LengthMismatch {
                predicted: 1,
                truth: 2
            }
        );
        assert!(mean_squared_error(&[], &[]).is_err());
    }
}
