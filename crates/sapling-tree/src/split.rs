use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::columns::ColumnSet;
use crate::impurity::{ColumnSplit, SplitCriterion, evaluate_column};

/// Find the best split across every column not yet used on this path.
///
/// Each eligible column is scored on its own rayon task against a shared,
/// read-only view of `rows` and `responses`. The ordered `collect` is the
/// join point: no result is consulted until every column has finished.
/// The reduction then keeps the strictly smallest impurity, so on an exact
/// tie the lowest column index wins regardless of completion order.
///
/// Returns `None` when no column is eligible or every eligible column holds
/// a single distinct value.
pub(crate) fn find_best_split(
    rows: &[Vec<f64>],
    responses: &[f64],
    used: &ColumnSet,
    criterion: SplitCriterion,
) -> Option<ColumnSplit> {
    let eligible: Vec<_> = used.eligible().collect();
    if eligible.is_empty() || rows.is_empty() {
        return None;
    }

    let scored: Vec<ColumnSplit> = eligible
        .into_par_iter()
        .map(|feature| evaluate_column(rows, responses, feature, criterion))
        .collect();

    scored
        .into_iter()
        .filter(|split| !split.impurity.is_unsplittable())
        .fold(None, |best: Option<ColumnSplit>, candidate| match best {
            Some(current) if current.impurity <= candidate.impurity => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::FeatureIndex;

    #[test]
    fn picks_lowest_impurity_column() {
        // Column 1 separates perfectly; column 0 does not.
        let rows = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 11.0],
            vec![4.0, 21.0],
        ];
        let responses = [0.0, 1.0, 0.0, 1.0];
        let split = find_best_split(&rows, &responses, &ColumnSet::new(2), SplitCriterion::Gini)
            .expect("a split exists");
        assert_eq!(split.feature.index(), 1);
        assert_eq!(split.threshold, 20.0);
        assert_eq!(split.impurity.value(), 0.0);
    }

    #[test]
    fn tie_goes_to_lowest_column() {
        // Columns 0, 1 and 2 all separate perfectly.
        let rows = vec![
            vec![1.0, 5.0, 0.1],
            vec![2.0, 6.0, 0.2],
            vec![3.0, 7.0, 0.3],
            vec![4.0, 8.0, 0.4],
        ];
        let responses = [0.0, 0.0, 1.0, 1.0];
        for _ in 0..32 {
            let split =
                find_best_split(&rows, &responses, &ColumnSet::new(3), SplitCriterion::Gini)
                    .expect("a split exists");
            assert_eq!(split.feature.index(), 0);
        }
    }

    #[test]
    fn used_columns_are_skipped() {
        let rows = vec![vec![1.0, 1.0], vec![2.0, 1.0], vec![3.0, 2.0]];
        let responses = [0.0, 0.0, 1.0];
        let used = ColumnSet::new(2).with_used(FeatureIndex::new(0));
        let split = find_best_split(&rows, &responses, &used, SplitCriterion::Gini)
            .expect("column 1 still splits");
        assert_eq!(split.feature.index(), 1);
        assert_eq!(split.threshold, 2.0);
    }

    #[test]
    fn all_constant_columns_yield_none() {
        let rows = vec![vec![5.0, 1.0], vec![5.0, 1.0], vec![5.0, 1.0]];
        let responses = [0.0, 1.0, 0.0];
        assert!(find_best_split(&rows, &responses, &ColumnSet::new(2), SplitCriterion::Gini).is_none());
    }

    #[test]
    fn no_eligible_column_yields_none() {
        let rows = vec![vec![1.0], vec![2.0]];
        let responses = [0.0, 1.0];
        let used = ColumnSet::new(1).with_used(FeatureIndex::new(0));
        assert!(find_best_split(&rows, &responses, &used, SplitCriterion::Gini).is_none());
    }
}
