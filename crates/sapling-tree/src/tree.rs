use std::fmt;

use tracing::{debug, instrument, trace};

use crate::{
    TreeError,
    columns::FitContext,
    impurity::SplitCriterion,
    node::{Node, NodeIndex},
    partition::partition,
    split::find_best_split,
};

/// Configuration for a binary decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter   | Default |
/// |-------------|---------|
/// | `criterion` | `Gini`  |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) max_depth: usize,
    pub(crate) criterion: SplitCriterion,
}

impl DecisionTreeConfig {
    /// Create a new config limited to `max_depth` levels below the root.
    ///
    /// A `max_depth` of 0 always produces a single leaf.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            criterion: SplitCriterion::Gini,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Return the maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Fit a tree on a row-major feature matrix and 0/1 responses.
    ///
    /// `rows[sample_idx][feature_idx]` is the feature matrix and
    /// `responses[sample_idx]` its label. Both are reordered in place, in
    /// lockstep, while the tree is grown: the same rows and labels remain,
    /// but callers must not rely on their order afterwards.
    ///
    /// # Errors
    ///
    /// | Variant                                | When                                     |
    /// |----------------------------------------|------------------------------------------|
    /// | [`TreeError::EmptyDataset`]            | `rows` is empty                          |
    /// | [`TreeError::ZeroFeatures`]            | rows have zero feature columns           |
    /// | [`TreeError::FeatureCountMismatch`]    | rows have inconsistent lengths           |
    /// | [`TreeError::ResponseLengthMismatch`]  | `responses.len() != rows.len()`          |
    /// | [`TreeError::NonFiniteValue`]          | any feature value is NaN or infinite     |
    /// | [`TreeError::NonBinaryResponse`]       | a response is not exactly 0.0 or 1.0     |
    #[instrument(skip(self, rows, responses), fields(n_samples = rows.len(), max_depth = self.max_depth))]
    pub fn fit(
        &self,
        rows: &mut [Vec<f64>],
        responses: &mut [f64],
    ) -> Result<DecisionTree, TreeError> {
        let n_features = validate(rows, responses)?;

        debug!(
            n_samples = rows.len(),
            n_features,
            max_depth = self.max_depth,
            criterion = %self.criterion,
            "fitting decision tree"
        );

        let mut builder = Builder {
            criterion: self.criterion,
            arena: Vec::new(),
        };
        let root = builder.build(rows, responses, FitContext::root(self.max_depth, n_features));
        debug_assert_eq!(root.index(), 0);

        let tree = DecisionTree {
            nodes: builder.arena,
            n_features,
        };

        debug!(
            n_nodes = tree.n_nodes(),
            n_leaves = tree.n_leaves(),
            depth = tree.depth(),
            "decision tree built"
        );

        Ok(tree)
    }
}

/// Check shape, finiteness, and label domain before any recursion.
///
/// Returns the number of feature columns.
fn validate(rows: &[Vec<f64>], responses: &[f64]) -> Result<usize, TreeError> {
    let Some(first) = rows.first() else {
        return Err(TreeError::EmptyDataset);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(TreeError::ZeroFeatures);
    }
    if responses.len() != rows.len() {
        return Err(TreeError::ResponseLengthMismatch {
            n_samples: rows.len(),
            n_responses: responses.len(),
        });
    }

    for (sample_index, row) in rows.iter().enumerate() {
        if row.len() != n_features {
            return Err(TreeError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(TreeError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }

    if let Some((sample_index, &value)) = responses
        .iter()
        .enumerate()
        .find(|&(_, &y)| y != 0.0 && y != 1.0)
    {
        return Err(TreeError::NonBinaryResponse {
            sample_index,
            value,
        });
    }

    Ok(n_features)
}

struct Builder {
    criterion: SplitCriterion,
    arena: Vec<Node>,
}

impl Builder {
    /// Recursively grow the subtree for `rows` and return its arena index.
    ///
    /// Children are built from disjoint `split_at_mut` halves of the same
    /// storage, left subtree first, so arena order is pre-order.
    fn build(
        &mut self,
        rows: &mut [Vec<f64>],
        responses: &mut [f64],
        ctx: FitContext,
    ) -> NodeIndex {
        let n_samples = rows.len();
        let positives = responses.iter().filter(|&&y| y == 1.0).count();
        let probability = positives as f64 / n_samples as f64;
        let impurity = self.criterion.impurity(positives, n_samples);

        let stop = if ctx.depth_exhausted() {
            Some("max depth")
        } else if positives == 0 || positives == n_samples {
            Some("pure")
        } else if !ctx.used.has_eligible() {
            Some("columns exhausted")
        } else {
            None
        };
        if let Some(reason) = stop {
            trace!(depth = ctx.depth, n_samples, probability, reason, "leaf");
            return self.push(Node::Leaf {
                probability,
                impurity,
                n_samples,
            });
        }

        let Some(split) = find_best_split(rows, responses, &ctx.used, self.criterion) else {
            trace!(depth = ctx.depth, n_samples, probability, reason = "no split", "leaf");
            return self.push(Node::Leaf {
                probability,
                impurity,
                n_samples,
            });
        };

        trace!(
            depth = ctx.depth,
            feature = split.feature.index(),
            threshold = split.threshold,
            split_impurity = split.impurity.value(),
            "split"
        );

        // Reserve the parent slot, recurse, then overwrite with the split.
        let node_idx = self.push(Node::Leaf {
            probability,
            impurity,
            n_samples,
        });

        let split_at = partition(rows, responses, split.feature, split.threshold);
        let child_ctx = ctx.child(split.feature);
        let (left_rows, right_rows) = rows.split_at_mut(split_at);
        let (left_responses, right_responses) = responses.split_at_mut(split_at);

        let left = self.build(left_rows, left_responses, child_ctx.clone());
        let right = self.build(right_rows, right_responses, child_ctx);

        self.arena[node_idx.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            split_impurity: split.impurity,
            probability,
            n_samples,
        };

        node_idx
    }

    fn push(&mut self, node: Node) -> NodeIndex {
        let idx = self.arena.len();
        self.arena.push(node);
        NodeIndex::new(idx)
    }
}

/// A fitted binary decision tree.
///
/// Stored as an arena-based `Vec<Node>` with index references; the root is
/// always at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Return the root node index.
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    /// Return the node stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` did not come from this tree.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.index()]
    }

    /// Return all nodes in pre-order (root first, left subtree before right).
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of features this tree was fitted on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((idx, d)) = stack.pop() {
            match self.node(idx).children() {
                Some((left, right)) => {
                    stack.push((left, d + 1));
                    stack.push((right, d + 1));
                }
                None => max_depth = max_depth.max(d),
            }
        }
        max_depth
    }
}

/// Renders one node per line, children indented two spaces under their parent:
/// `column < threshold  (split impurity)` for splits, `(probability)` for leaves.
impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.root(), 0usize)];
        let mut first = true;
        while let Some((idx, level)) = stack.pop() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            let pad = "  ".repeat(level);
            match self.node(idx) {
                Node::Leaf { probability, .. } => write!(f, "{pad}({probability:.2})")?,
                Node::Split {
                    feature,
                    threshold,
                    split_impurity,
                    left,
                    right,
                    ..
                } => {
                    write!(
                        f,
                        "{pad}{feature} < {threshold:.2}  ({:.3})",
                        split_impurity.value()
                    )?;
                    stack.push((*right, level + 1));
                    stack.push((*left, level + 1));
                }
            }
        }
        Ok(())
    }
}
