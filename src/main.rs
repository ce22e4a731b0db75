use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use sapling_io::{Dataset, DatasetReader, LabelColumn};
use sapling_tree::{
    ConfusionMatrix, CrossValidation, DecisionTreeConfig, SplitCriterion, accuracy,
    mean_squared_error,
};

#[derive(Parser)]
#[command(name = "sapling")]
#[command(about = "Binary classification with depth-bounded decision trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for fold assignment and shuffling
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Where the training data lives and how its labels are encoded.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the feature CSV file
    #[arg(long)]
    data: PathBuf,

    /// Separate one-column labels file (otherwise labels come from --label-column)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Zero-based label column in the data file (defaults to the last column)
    #[arg(long, conflicts_with = "labels")]
    label_column: Option<usize>,

    /// Label token counted as the positive class (otherwise labels must be 0 or 1)
    #[arg(long)]
    positive_label: Option<String>,

    /// Comma-separated zero-based columns to skip, e.g. an id column
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<usize>,

    /// The CSV files have no header row
    #[arg(long, default_value_t = false)]
    no_headers: bool,
}

/// Shared tree parameters.
#[derive(Args, Debug, Clone)]
struct TreeArgs {
    /// Maximum tree depth (0 = a single leaf)
    #[arg(long, default_value_t = 3)]
    max_depth: usize,

    /// Split criterion: "gini" or "entropy"
    #[arg(long, default_value = "gini")]
    criterion: String,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate accuracy with stratified k-fold cross-validation
    Evaluate {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        tree: TreeArgs,

        /// Number of cross-validation folds
        #[arg(long, default_value_t = 5)]
        cv_folds: usize,

        /// Shuffle the rows (with --seed) before assigning folds
        #[arg(long, default_value_t = false)]
        shuffle: bool,
    },

    /// Fit a tree on the full dataset and print it with its training scores
    Fit {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Fit on the training data, then predict the rows of a second CSV
    ///
    /// The test file holds feature columns only unless --test-labels or
    /// --test-has-labels is given, in which case the predictions are scored.
    Predict {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        tree: TreeArgs,

        /// Path to the CSV file to predict
        #[arg(long)]
        test: PathBuf,

        /// Labels file for --test
        #[arg(long, conflicts_with = "test_has_labels")]
        test_labels: Option<PathBuf>,

        /// --test carries a label column laid out like the training file
        #[arg(long, default_value_t = false)]
        test_has_labels: bool,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    data: String,
    n_samples: usize,
    n_features: usize,
    n_positive: usize,
    max_depth: usize,
    criterion: String,
    cv_folds: usize,
    fold_accuracies: Vec<f64>,
    cv_mean_accuracy: f64,
    cv_std_accuracy: f64,
    mean_squared_error: f64,
    confusion_matrix: [[usize; 2]; 2],
    precision: f64,
    recall: f64,
    f1: f64,
}

#[derive(Serialize)]
struct FitOutput {
    data: String,
    n_samples: usize,
    n_features: usize,
    feature_names: Vec<String>,
    max_depth: usize,
    criterion: String,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    training_accuracy: f64,
    training_mean_squared_error: f64,
    tree: Vec<String>,
}

#[derive(Serialize)]
struct PredictOutput {
    train: String,
    test: String,
    n_train: usize,
    n_test: usize,
    predictions: Vec<f64>,
    probabilities: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mean_squared_error: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confusion_matrix: Option<[[usize; 2]; 2]>,
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        other => anyhow::bail!("unknown split criterion: {other} (expected gini or entropy)"),
    }
}

fn tree_config(args: &TreeArgs) -> Result<DecisionTreeConfig> {
    Ok(DecisionTreeConfig::new(args.max_depth).with_criterion(parse_criterion(&args.criterion)?))
}

fn build_reader(args: &DataArgs, data: &Path, labels: Option<&Path>) -> DatasetReader {
    let mut reader = DatasetReader::new(data)
        .with_headers(!args.no_headers)
        .with_ignored_columns(args.ignore.clone());
    reader = match (labels, args.label_column) {
        (Some(labels), _) => reader.with_labels_file(labels),
        (None, Some(column)) => reader.with_label_column(LabelColumn::Index(column)),
        (None, None) => reader.with_label_column(LabelColumn::Last),
    };
    if let Some(token) = &args.positive_label {
        reader = reader.with_positive_label(token.clone());
    }
    reader
}

fn read_dataset(args: &DataArgs) -> Result<Dataset> {
    build_reader(args, &args.data, args.labels.as_deref())
        .read()
        .with_context(|| format!("failed to read {}", args.data.display()))
}

/// Read the rows to predict, with their labels when the caller supplied any.
fn read_test_rows(
    args: &DataArgs,
    test: &Path,
    test_labels: Option<&Path>,
    test_has_labels: bool,
) -> Result<(Vec<Vec<f64>>, Option<Vec<f64>>)> {
    let context = || format!("failed to read {}", test.display());
    if test_labels.is_none() && !test_has_labels {
        let features = DatasetReader::new(test)
            .with_headers(!args.no_headers)
            .with_ignored_columns(args.ignore.clone())
            .read_features()
            .with_context(context)?;
        return Ok((features.into_rows(), None));
    }
    let (rows, truth) = build_reader(args, test, test_labels)
        .read()
        .with_context(context)?
        .into_parts();
    Ok((rows, Some(truth)))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Evaluate {
            data,
            tree,
            cv_folds,
            shuffle,
        } => {
            let config = tree_config(&tree)?;

            // 1. Read dataset, optionally shuffled
            let mut dataset = read_dataset(&data)?;
            if shuffle {
                dataset.shuffle(cli.seed);
                info!(seed = cli.seed, "dataset shuffled");
            }

            // 2. Cross-validate
            let cv = CrossValidation::new(cv_folds)?.with_seed(cli.seed);
            let result = cv
                .evaluate(&config, dataset.rows(), dataset.responses())
                .context("cross-validation failed")?;
            let metrics = result.confusion_matrix.positive_metrics();

            let output = EvaluateOutput {
                data: data.data.display().to_string(),
                n_samples: result.n_samples,
                n_features: result.n_features,
                n_positive: dataset.n_positive(),
                max_depth: config.max_depth(),
                criterion: config.criterion().to_string(),
                cv_folds: result.n_folds,
                fold_accuracies: result.fold_accuracies,
                cv_mean_accuracy: result.mean_accuracy,
                cv_std_accuracy: result.std_accuracy,
                mean_squared_error: result.mean_squared_error,
                confusion_matrix: result.confusion_matrix.as_rows(),
                precision: metrics.precision,
                recall: metrics.recall,
                f1: metrics.f1,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Fit { data, tree } => {
            let config = tree_config(&tree)?;
            let dataset = read_dataset(&data)?;
            let feature_names = dataset.feature_names().to_vec();

            // Fit on a copy so the file order is kept for scoring
            let (rows, responses) = dataset.into_parts();
            let (mut fit_rows, mut fit_responses) = (rows.clone(), responses.clone());
            let fitted = config
                .fit(&mut fit_rows, &mut fit_responses)
                .context("tree fitting failed")?;

            let predictions = fitted.predict_batch(&rows)?;
            let output = FitOutput {
                data: data.data.display().to_string(),
                n_samples: rows.len(),
                n_features: fitted.n_features(),
                feature_names,
                max_depth: config.max_depth(),
                criterion: config.criterion().to_string(),
                n_nodes: fitted.n_nodes(),
                n_leaves: fitted.n_leaves(),
                depth: fitted.depth(),
                training_accuracy: accuracy(&predictions, &responses)?,
                training_mean_squared_error: mean_squared_error(&predictions, &responses)?,
                tree: fitted.to_string().lines().map(String::from).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            data,
            tree,
            test,
            test_labels,
            test_has_labels,
        } => {
            let config = tree_config(&tree)?;

            // 1. Fit on the training data
            let train = read_dataset(&data)?;
            let n_train = train.n_samples();
            let (mut train_rows, mut train_responses) = train.into_parts();
            let fitted = config
                .fit(&mut train_rows, &mut train_responses)
                .context("tree fitting failed")?;

            // 2. Read and predict the test data
            let (test_rows, truth) =
                read_test_rows(&data, &test, test_labels.as_deref(), test_has_labels)?;
            let predictions = fitted
                .predict_batch(&test_rows)
                .context("prediction failed")?;
            let probabilities = fitted.predict_proba_batch(&test_rows)?;

            // 3. Score only when labels came with the test data
            let truth = truth.as_deref();
            let output = PredictOutput {
                train: data.data.display().to_string(),
                test: test.display().to_string(),
                n_train,
                n_test: test_rows.len(),
                accuracy: truth.map(|t| accuracy(&predictions, t)).transpose()?,
                mean_squared_error: truth
                    .map(|t| mean_squared_error(&predictions, t))
                    .transpose()?,
                confusion_matrix: truth
                    .map(|t| ConfusionMatrix::from_labels(t, &predictions).map(|m| m.as_rows()))
                    .transpose()?,
                predictions,
                probabilities,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
