//! Label prediction for fitted trees.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::TreeError;
use crate::node::{Node, NodeIndex};
use crate::tree::DecisionTree;

impl DecisionTree {
    /// Predict the 0/1 label for a single sample.
    ///
    /// Descends from the root, going left when `sample[feature] < threshold`.
    /// The reached leaf predicts 1.0 only when its positive fraction is
    /// strictly above 0.5, so an even leaf predicts 0.0.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<f64, TreeError> {
        let probability = self.predict_proba(sample)?;
        Ok(if probability > 0.5 { 1.0 } else { 0.0 })
    }

    /// Return the positive-class fraction of the leaf `sample` lands in.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<f64, TreeError> {
        if sample.len() != self.n_features {
            return Err(TreeError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.node(self.traverse(sample)).probability())
    }

    /// Predict labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<f64>, TreeError> {
        samples
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return leaf probabilities for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_proba_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<f64>, TreeError> {
        samples
            .into_par_iter()
            .map(|sample| self.predict_proba(sample))
            .collect()
    }

    /// Traverse the tree from the root and return the index of the leaf.
    fn traverse(&self, sample: &[f64]) -> NodeIndex {
        let mut idx = self.root();
        loop {
            match self.node(idx) {
                Node::Leaf { .. } => return idx,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{DecisionTreeConfig, TreeError};

    fn fitted(max_depth: usize) -> crate::DecisionTree {
        let mut rows = vec![vec![1.0, 5.0], vec![2.0, 4.0], vec![3.0, 3.0], vec![8.0, 1.0]];
        let mut responses = vec![0.0, 0.0, 1.0, 1.0];
        DecisionTreeConfig::new(max_depth)
            .fit(&mut rows, &mut responses)
            .unwrap()
    }

    #[test]
    fn routes_by_strict_less_than() {
        let tree = fitted(1);
        assert_eq!(tree.predict(&[2.0, 9.0]).unwrap(), 0.0);
        assert_eq!(tree.predict(&[5.0, 9.0]).unwrap(), 1.0);
        // Exactly at the threshold goes right.
        assert_eq!(tree.predict(&[3.0, 0.0]).unwrap(), 1.0);
    }

    #[test]
    fn even_leaf_predicts_zero() {
        let tree = fitted(0);
        assert!((tree.predict_proba(&[1.0, 1.0]).unwrap() - 0.5).abs() < f64::EPSILON);
        assert_eq!(tree.predict(&[1.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn batch_matches_single() {
        let tree = fitted(1);
        let samples = vec![vec![0.0, 0.0], vec![2.9, 0.0], vec![3.0, 0.0], vec![100.0, 0.0]];
        let batch = tree.predict_batch(&samples).unwrap();
        assert_eq!(batch, vec![0.0, 0.0, 1.0, 1.0]);
        let proba = tree.predict_proba_batch(&samples).unwrap();
        assert_eq!(proba, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let tree = fitted(1);
        let err = tree.predict(&[1.0]).unwrap_err();
        assert_eq!(err, TreeError::PredictionFeatureMismatch { expected: 2, got: 1 });
        assert!(tree.predict_batch(&[vec![1.0, 2.0], vec![1.0, 2.0, 3.0]]).is_err());
    }
}
