//! Accuracy regression tests for sapling-tree.
//!
//! These tests verify that algorithmic changes do not degrade decision tree
//! classification accuracy on a deterministic synthetic dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use sapling_tree::{
    ConfusionMatrix, CrossValidation, DecisionTreeConfig, SplitCriterion, accuracy,
};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic classification dataset
// ---------------------------------------------------------------------------

/// Generate a 300-sample, 8-feature binary classification dataset.
///
/// Features 0-1 are informative (label * 2.0 + noise in [0, 1.5]).
/// Features 2-7 are pure noise in [0, 1.5].
/// Samples alternate between the two labels.
fn make_classification() -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n_samples = 300;
    let n_features = 8;

    let mut rows = Vec::with_capacity(n_samples);
    let mut responses = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let label = (i % 2) as f64;
        responses.push(label);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 2 { label * 2.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 1.5
            })
            .collect();
        rows.push(row);
    }
    (rows, responses)
}

// ---------------------------------------------------------------------------
// a) cv_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// 5-fold cross-validation mean accuracy must exceed 0.85 on the synthetic dataset.
///
/// A single split on either informative column separates the classes.
#[test]
fn cv_accuracy_above_threshold() {
    let (rows, responses) = make_classification();
    let cv = CrossValidation::new(5).unwrap().with_seed(42);
    let result = cv
        .evaluate(&DecisionTreeConfig::new(3), &rows, &responses)
        .unwrap();

    assert!(
        result.mean_accuracy > 0.85,
        "cv mean_accuracy {} <= 0.85",
        result.mean_accuracy
    );
    assert_eq!(result.confusion_matrix.total(), 300);
}

// ---------------------------------------------------------------------------
// b) root_splits_on_informative_feature
// ---------------------------------------------------------------------------

/// The root split must use one of the two informative columns.
#[test]
fn root_splits_on_informative_feature() {
    let (mut rows, mut responses) = make_classification();
    let tree = DecisionTreeConfig::new(2)
        .fit(&mut rows, &mut responses)
        .unwrap();

    match tree.node(tree.root()) {
        sapling_tree::Node::Split { feature, .. } => {
            assert!(feature.index() < 2, "root split on noise column {feature}");
        }
        sapling_tree::Node::Leaf { .. } => panic!("root should split"),
    }
}

// ---------------------------------------------------------------------------
// c) deterministic_fit
// ---------------------------------------------------------------------------

/// Same config and data must produce identical trees across independent runs.
#[test]
fn deterministic_fit() {
    let (rows, responses) = make_classification();
    let cfg = DecisionTreeConfig::new(4);

    let (mut rows1, mut responses1) = (rows.clone(), responses.clone());
    let (mut rows2, mut responses2) = (rows.clone(), responses.clone());
    let tree1 = cfg.fit(&mut rows1, &mut responses1).unwrap();
    let tree2 = cfg.fit(&mut rows2, &mut responses2).unwrap();

    assert_eq!(tree1, tree2, "trees differ across runs");
    assert_eq!(
        tree1.predict_batch(&rows).unwrap(),
        tree2.predict_batch(&rows).unwrap()
    );
}

// ---------------------------------------------------------------------------
// d) training_accuracy_improves_with_depth
// ---------------------------------------------------------------------------

/// Deeper trees fit the training data at least as well as shallower ones.
#[test]
fn training_accuracy_improves_with_depth() {
    let (rows, responses) = make_classification();
    let mut previous = 0.0;
    for max_depth in 0..=4 {
        let (mut train_rows, mut train_responses) = (rows.clone(), responses.clone());
        let tree = DecisionTreeConfig::new(max_depth)
            .fit(&mut train_rows, &mut train_responses)
            .unwrap();
        let predictions = tree.predict_batch(&rows).unwrap();
        let acc = accuracy(&predictions, &responses).unwrap();
        assert!(
            acc >= previous,
            "depth {max_depth} accuracy {acc} < previous {previous}"
        );
        previous = acc;
    }
    assert!(previous > 0.9, "depth 4 training accuracy {previous} <= 0.9");
}

// ---------------------------------------------------------------------------
// e) entropy_matches_gini_quality
// ---------------------------------------------------------------------------

/// Entropy-grown trees must reach comparable training accuracy.
#[test]
fn entropy_matches_gini_quality() {
    let (rows, responses) = make_classification();
    let (mut train_rows, mut train_responses) = (rows.clone(), responses.clone());
    let tree = DecisionTreeConfig::new(3)
        .with_criterion(SplitCriterion::Entropy)
        .fit(&mut train_rows, &mut train_responses)
        .unwrap();

    let predictions = tree.predict_batch(&rows).unwrap();
    let cm = ConfusionMatrix::from_labels(&responses, &predictions).unwrap();
    assert!(cm.accuracy() > 0.9, "entropy training accuracy {}", cm.accuracy());
}
