//! Binary classification decision trees: fit, predict, evaluate.
//!
//! Trees are grown greedily with Gini (or entropy) impurity. At every node
//! the best threshold is searched for each unused feature column in
//! parallel via rayon, and a feature is never reused on the same
//! root-to-leaf path.

mod columns;
mod confusion;
mod error;
mod eval;
mod impurity;
mod metrics;
mod node;
mod partition;
mod predict;
mod split;
mod tree;

pub use confusion::{BinaryMetrics, ConfusionMatrix};
pub use error::TreeError;
pub use eval::{CrossValidation, CrossValidationResult};
pub use impurity::SplitCriterion;
pub use metrics::{accuracy, mean_squared_error};
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use tree::{DecisionTree, DecisionTreeConfig};
