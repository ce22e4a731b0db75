use std::fmt;

/// Zero-based feature column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Create a new feature index from a zero-based column position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Criterion-agnostic impurity value (Gini or Entropy).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    /// Marker returned for a column that has no split boundary at all.
    ///
    /// Strictly above the worst impurity either criterion can produce for
    /// two classes (Gini 0.5, entropy 1.0 bit).
    pub const UNSPLITTABLE: Impurity = Impurity(1.1);

    /// Create a new impurity value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return `true` if this is the [`Impurity::UNSPLITTABLE`] marker.
    #[must_use]
    pub fn is_unsplittable(self) -> bool {
        self.0 >= Self::UNSPLITTABLE.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`] rather than pointers. Every node is owned by exactly one
/// parent, and the root lives at index 0.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An interior split node.
    Split {
        /// Feature used for the split.
        feature: FeatureIndex,
        /// Threshold value: samples with feature < threshold go left.
        threshold: f64,
        /// Index of the left child node.
        left: NodeIndex,
        /// Index of the right child node.
        right: NodeIndex,
        /// Impurity of the samples at this node before splitting.
        impurity: Impurity,
        /// Weighted impurity of the two children produced by the split.
        split_impurity: Impurity,
        /// Fraction of positive samples that reached this node.
        probability: f64,
        /// Number of training samples that reached this node.
        n_samples: usize,
    },
    /// A terminal leaf node.
    Leaf {
        /// Fraction of positive samples that reached this leaf.
        probability: f64,
        /// Impurity of the samples at this leaf.
        impurity: Impurity,
        /// Number of training samples in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the impurity at this node (before splitting for interior nodes).
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return the fraction of positive training samples at this node.
    #[must_use]
    pub fn probability(&self) -> f64 {
        match self {
            Node::Split { probability, .. } | Node::Leaf { probability, .. } => *probability,
        }
    }

    /// Return the left and right children, or `None` for a leaf.
    #[must_use]
    pub fn children(&self) -> Option<(NodeIndex, NodeIndex)> {
        match self {
            Node::Split { left, right, .. } => Some((*left, *right)),
            Node::Leaf { .. } => None,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
