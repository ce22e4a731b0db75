//! I/O error types for sapling-io.

use std::path::PathBuf;

/// Errors from file I/O, CSV parsing, and dataset validation.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when an input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains no data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the first row.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based data row index (excluding header).
        row_index: usize,
        /// Expected number of columns.
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a feature cell is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based data row index (excluding header).
        row_index: usize,
        /// Zero-based column index in the file.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when no columns remain after removing the label and ignored columns.
    #[error("no feature columns in {path}")]
    NoFeatureColumns {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the configured label column is outside the file.
    #[error("label column {column} out of range in {path}: file has {n_columns} columns")]
    MissingLabelColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Requested zero-based label column.
        column: usize,
        /// Number of columns in the file.
        n_columns: usize,
    },

    /// Returned when a numeric label is not exactly 0 or 1.
    #[error("invalid label in {path}: row {row_index}, raw value \"{raw}\" (expected 0 or 1)")]
    InvalidLabel {
        /// Path to the file holding the label.
        path: PathBuf,
        /// Zero-based data row index (excluding header).
        row_index: usize,
        /// The raw label string.
        raw: String,
    },

    /// Returned when a separate labels file has a different row count than the feature file.
    #[error("{labels_path} has {n_labels} labels but {features_path} has {n_rows} rows")]
    LabelCountMismatch {
        /// Path to the feature CSV file.
        features_path: PathBuf,
        /// Path to the labels file.
        labels_path: PathBuf,
        /// Number of feature rows.
        n_rows: usize,
        /// Number of labels.
        n_labels: usize,
    },
}
