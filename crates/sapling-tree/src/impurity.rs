//! Per-column split evaluation.

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitCriterion {
    /// Gini impurity: `1 - p² - (1 - p)²`, i.e. `2·p·(1 - p)`
    #[default]
    Gini,
    /// Binary entropy in bits: `-p·log2(p) - (1 - p)·log2(1 - p)`
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a group holding `positives` out of `n_samples`.
    ///
    /// An empty group has zero impurity.
    #[must_use]
    pub fn impurity(&self, positives: usize, n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        // Both class counts enter symmetrically, so mirrored groups score bit-identically.
        let n = n_samples as f64;
        let (pos, neg) = (positives as f64, (n_samples - positives) as f64);
        let value = match self {
            SplitCriterion::Gini => 2.0 * pos * neg / (n * n),
            SplitCriterion::Entropy => -[pos / n, neg / n]
                .iter()
                .filter(|&&x| x > 0.0)
                .map(|&x| x * x.log2())
                .sum::<f64>(),
        };
        Impurity::new(value)
    }

    /// Size-weighted impurity of a left/right partition.
    fn weighted(
        &self,
        positives_left: usize,
        n_left: usize,
        positives_right: usize,
        n_right: usize,
    ) -> f64 {
        let n = (n_left + n_right) as f64;
        (n_left as f64 / n) * self.impurity(positives_left, n_left).value()
            + (n_right as f64 / n) * self.impurity(positives_right, n_right).value()
    }
}

impl std::fmt::Display for SplitCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitCriterion::Gini => f.write_str("gini"),
            SplitCriterion::Entropy => f.write_str("entropy"),
        }
    }
}

/// Best threshold found on a single column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ColumnSplit {
    /// Weighted impurity of the split, or [`Impurity::UNSPLITTABLE`].
    pub(crate) impurity: Impurity,
    pub(crate) feature: FeatureIndex,
    /// Samples with `value < threshold` go left.
    pub(crate) threshold: f64,
}

/// Find the threshold on `feature` that minimizes weighted impurity.
///
/// Sorts `(value, response)` pairs by value and sweeps them once, keeping
/// the running positive count on the left. Only boundaries between two
/// distinct consecutive values are scored, and the threshold is the upper
/// value of the best boundary. A column holding a single distinct value
/// has no boundary: the result keeps [`Impurity::UNSPLITTABLE`] and the
/// smallest value as threshold.
///
/// `responses` must already be validated as 0.0 / 1.0.
pub(crate) fn evaluate_column(
    rows: &[Vec<f64>],
    responses: &[f64],
    feature: FeatureIndex,
    criterion: SplitCriterion,
) -> ColumnSplit {
    let col = feature.index();
    let mut pairs: Vec<(f64, bool)> = rows
        .iter()
        .zip(responses)
        .map(|(row, &response)| (row[col], response == 1.0))
        .collect();
    // total_cmp orders -0.0 before 0.0; the `==` run check below still merges
    // them, matching the `<` routing rule.
    pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let n_samples = pairs.len();
    let total_positive = pairs.iter().filter(|(_, positive)| *positive).count();

    let mut best = ColumnSplit {
        impurity: Impurity::UNSPLITTABLE,
        feature,
        threshold: pairs.first().map_or(0.0, |&(value, _)| value),
    };

    let mut positives_left = 0usize;
    for i in 1..n_samples {
        let (prev_value, prev_positive) = pairs[i - 1];
        if prev_positive {
            positives_left += 1;
        }
        let value = pairs[i].0;
        if value == prev_value {
            continue;
        }

        let weighted = criterion.weighted(
            positives_left,
            i,
            total_positive - positives_left,
            n_samples - i,
        );
        if weighted < best.impurity.value() {
            best.impurity = Impurity::new(weighted);
            best.threshold = value;
        }
    }

    best
}
