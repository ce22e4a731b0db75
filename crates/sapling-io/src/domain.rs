//! Domain types for sapling-io.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A labelled binary classification dataset.
///
/// Produced by [`DatasetReader`](crate::DatasetReader). Rows and responses
/// are stored in parallel vectors: `responses[i]` is the 0/1 label of
/// `rows[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Feature column names from the CSV header, or `f0..fN` without one.
    feature_names: Vec<String>,
    /// Feature values: `rows[sample_index][feature_index]`.
    rows: Vec<Vec<f64>>,
    /// Labels, each exactly 0.0 or 1.0.
    responses: Vec<f64>,
}

impl Dataset {
    /// Create a new dataset.
    pub(crate) fn new(feature_names: Vec<String>, rows: Vec<Vec<f64>>, responses: Vec<f64>) -> Self {
        debug_assert_eq!(rows.len(), responses.len());
        Self {
            feature_names,
            rows,
            responses,
        }
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Return the 0/1 labels.
    #[must_use]
    pub fn responses(&self) -> &[f64] {
        &self.responses
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return the number of samples labelled 1.
    #[must_use]
    pub fn n_positive(&self) -> usize {
        self.responses.iter().filter(|&&y| y == 1.0).count()
    }

    /// Shuffle rows and responses together with a seeded Fisher-Yates pass.
    ///
    /// The same seed always yields the same permutation.
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for i in (1..self.rows.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.rows.swap(i, j);
            self.responses.swap(i, j);
        }
    }

    /// Consume the dataset, returning `(rows, responses)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Vec<f64>>, Vec<f64>) {
        (self.rows, self.responses)
    }
}

/// Unlabelled feature rows, as read for prediction.
///
/// Produced by [`DatasetReader::read_features`](crate::DatasetReader::read_features).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureSet {
    pub(crate) fn new(feature_names: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            feature_names,
            rows,
        }
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Consume the set, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, (i * 10) as f64]).collect();
        let responses: Vec<f64> = (0..10).map(|i| f64::from(i % 3 == 0)).collect();
        Dataset::new(vec!["a".into(), "b".into()], rows, responses)
    }

    #[test]
    fn shuffle_keeps_rows_with_labels() {
        let mut ds = sample();
        ds.shuffle(7);
        for (row, &y) in ds.rows().iter().zip(ds.responses()) {
            let id = row[0] as usize;
            assert_eq!(y, f64::from(id % 3 == 0));
            assert_eq!(row[1], row[0] * 10.0);
        }
        assert_eq!(ds.n_positive(), 4);
    }

    #[test]
    fn shuffle_is_a_seeded_permutation() {
        let mut a = sample();
        let mut b = sample();
        a.shuffle(42);
        b.shuffle(42);
        assert_eq!(a, b);

        let mut ids: Vec<usize> = a.rows().iter().map(|r| r[0] as usize).collect();
        assert_ne!(ids, (0..10).collect::<Vec<_>>());
        ids.sort_unstable();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_of_empty_and_single_is_noop() {
        let mut empty = Dataset::new(vec!["a".into()], vec![], vec![]);
        empty.shuffle(1);
        assert_eq!(empty.n_samples(), 0);

        let mut one = Dataset::new(vec!["a".into()], vec![vec![3.0]], vec![1.0]);
        one.shuffle(1);
        assert_eq!(one.rows(), &[vec![3.0]]);
    }

    #[test]
    fn into_parts_returns_parallel_vectors() {
        let (rows, responses) = sample().into_parts();
        assert_eq!(rows.len(), 10);
        assert_eq!(responses.len(), 10);
    }
}
