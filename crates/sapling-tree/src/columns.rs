//! Per-path bookkeeping for the tree builder.

use crate::node::FeatureIndex;

/// One flag per feature column marking it as already split on.
///
/// Passed down the tree by value: a child receives a copy of its parent's
/// set with the parent's split column added, so marks never leak between
/// sibling subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnSet {
    used: Vec<bool>,
}

impl ColumnSet {
    /// Create a set over `n_features` columns with none marked.
    pub(crate) fn new(n_features: usize) -> Self {
        Self {
            used: vec![false; n_features],
        }
    }

    /// Return a copy of this set with `feature` marked.
    #[must_use]
    pub(crate) fn with_used(&self, feature: FeatureIndex) -> Self {
        let mut used = self.used.clone();
        used[feature.index()] = true;
        Self { used }
    }

    pub(crate) fn is_used(&self, feature: FeatureIndex) -> bool {
        self.used[feature.index()]
    }

    /// Iterate the columns that are still eligible, in ascending order.
    pub(crate) fn eligible(&self) -> impl Iterator<Item = FeatureIndex> + '_ {
        (0..self.used.len())
            .map(FeatureIndex::new)
            .filter(move |&feature| !self.is_used(feature))
    }

    pub(crate) fn has_eligible(&self) -> bool {
        self.used.iter().any(|used| !used)
    }
}

/// Mutable progress state for one recursive `build` call.
#[derive(Debug, Clone)]
pub(crate) struct FitContext {
    pub(crate) max_depth: usize,
    pub(crate) depth: usize,
    pub(crate) used: ColumnSet,
}

impl FitContext {
    pub(crate) fn root(max_depth: usize, n_features: usize) -> Self {
        Self {
            max_depth,
            depth: 0,
            used: ColumnSet::new(n_features),
        }
    }

    /// Context shared by both children of a node split on `feature`.
    #[must_use]
    pub(crate) fn child(&self, feature: FeatureIndex) -> Self {
        Self {
            max_depth: self.max_depth,
            depth: self.depth + 1,
            used: self.used.with_used(feature),
        }
    }

    pub(crate) fn depth_exhausted(&self) -> bool {
        self.depth >= self.max_depth
    }
}
