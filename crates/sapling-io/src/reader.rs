//! CSV dataset reader with full input validation.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{Dataset, FeatureSet};

/// Which column of the feature file holds the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelColumn {
    /// Zero-based column index.
    Index(usize),
    /// The last column of each row.
    #[default]
    Last,
}

/// Feature names, feature rows and in-file labels, in file order.
type Table = (Vec<String>, Vec<Vec<f64>>, Vec<f64>);

#[derive(Debug, Clone)]
enum LabelSource {
    Column(LabelColumn),
    File(PathBuf),
}

/// Reads a labelled binary classification dataset from CSV.
///
/// Labels come either from a column of the feature file or from the first
/// column of a separate labels file with one row per sample. Numeric labels
/// must be exactly `0` or `1`; with a positive label configured, a label
/// equal to that token is 1 and anything else is 0.
///
/// [`read_features`](Self::read_features) reads a file with no labels at all,
/// e.g. new samples to predict.
///
/// # Defaults
///
/// | Parameter        | Default              |
/// |------------------|----------------------|
/// | label            | last column          |
/// | `positive_label` | none (numeric 0/1)   |
/// | ignored columns  | none                 |
/// | `has_headers`    | `true`               |
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | A file doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::InconsistentRowLength`] | Row has a different column count than the first |
/// | [`IoError::NonFiniteValue`] | Feature cell is NaN, Inf, or unparseable |
/// | [`IoError::NoFeatureColumns`] | Nothing left after removing label and ignored columns |
/// | [`IoError::MissingLabelColumn`] | Label column index is out of range |
/// | [`IoError::InvalidLabel`] | Numeric label is not 0 or 1 |
/// | [`IoError::LabelCountMismatch`] | Labels file row count differs from the feature file |
#[derive(Debug, Clone)]
pub struct DatasetReader {
    path: PathBuf,
    labels: LabelSource,
    positive_label: Option<String>,
    ignored_columns: Vec<usize>,
    has_headers: bool,
}

impl DatasetReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            labels: LabelSource::Column(LabelColumn::Last),
            positive_label: None,
            ignored_columns: Vec::new(),
            has_headers: true,
        }
    }

    /// Take labels from the given column of the feature file.
    #[must_use]
    pub fn with_label_column(mut self, column: LabelColumn) -> Self {
        self.labels = LabelSource::Column(column);
        self
    }

    /// Take labels from the first column of a separate file.
    ///
    /// Every column of the feature file is then a feature unless ignored.
    #[must_use]
    pub fn with_labels_file(mut self, path: &Path) -> Self {
        self.labels = LabelSource::File(path.to_path_buf());
        self
    }

    /// Treat labels equal to `token` as positive and all others as negative.
    #[must_use]
    pub fn with_positive_label(mut self, token: impl Into<String>) -> Self {
        self.positive_label = Some(token.into());
        self
    }

    /// Skip the given zero-based columns (e.g. an id column).
    #[must_use]
    pub fn with_ignored_columns(mut self, columns: Vec<usize>) -> Self {
        self.ignored_columns = columns;
        self
    }

    /// Set whether the first row of every file is a header.
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Read and validate the CSV file(s), returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let (feature_names, rows, mut responses) = self.read_table(true)?;

        if let LabelSource::File(labels_path) = &self.labels {
            responses = self.read_labels_file(labels_path)?;
            if responses.len() != rows.len() {
                return Err(IoError::LabelCountMismatch {
                    features_path: self.path.clone(),
                    labels_path: labels_path.clone(),
                    n_rows: rows.len(),
                    n_labels: responses.len(),
                });
            }
        }

        let dataset = Dataset::new(feature_names, rows, responses);
        info!(
            n_samples = dataset.n_samples(),
            n_features = dataset.n_features(),
            n_positive = dataset.n_positive(),
            "dataset loaded"
        );

        Ok(dataset)
    }

    /// Read an unlabelled CSV file, returning a [`FeatureSet`].
    ///
    /// Every column that is not ignored is a feature; the label settings
    /// are not consulted.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read_features(&self) -> Result<FeatureSet, IoError> {
        let (feature_names, rows, _) = self.read_table(false)?;
        let features = FeatureSet::new(feature_names, rows);
        info!(
            n_samples = features.n_samples(),
            n_features = features.n_features(),
            "feature rows loaded"
        );
        Ok(features)
    }

    fn read_table(&self, labelled: bool) -> Result<Table, IoError> {
        let mut rdr = self.open(&self.path)?;

        // flexible(true) in `open` lets our own InconsistentRowLength check fire.
        let header = rdr
            .headers()
            .map_err(|e| csv_error(&self.path, e))?
            .clone();
        let n_columns = header.len();
        if n_columns == 0 {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let label_col = match &self.labels {
            _ if !labelled => None,
            LabelSource::Column(LabelColumn::Last) => Some(n_columns - 1),
            LabelSource::Column(LabelColumn::Index(column)) => {
                if *column >= n_columns {
                    return Err(IoError::MissingLabelColumn {
                        path: self.path.clone(),
                        column: *column,
                        n_columns,
                    });
                }
                Some(*column)
            }
            LabelSource::File(_) => None,
        };

        let ignored: HashSet<usize> = self.ignored_columns.iter().copied().collect();
        let feature_cols: Vec<usize> = (0..n_columns)
            .filter(|c| Some(*c) != label_col && !ignored.contains(c))
            .collect();
        if feature_cols.is_empty() {
            return Err(IoError::NoFeatureColumns {
                path: self.path.clone(),
            });
        }
        debug!(n_columns, n_features = feature_cols.len(), ?label_col, "resolved CSV columns");

        let feature_names: Vec<String> = if self.has_headers {
            feature_cols
                .iter()
                .map(|&c| header.get(c).unwrap_or_default().to_string())
                .collect()
        } else {
            (0..feature_cols.len()).map(|f| format!("f{f}")).collect()
        };

        let mut rows = Vec::new();
        let mut responses = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;

            if record.len() != n_columns {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: n_columns,
                    got: record.len(),
                });
            }

            let mut row = Vec::with_capacity(feature_cols.len());
            for &col_index in &feature_cols {
                let raw = record.get(col_index).unwrap_or_default();
                row.push(self.parse_feature(raw, row_index, col_index)?);
            }
            rows.push(row);

            if let Some(c) = label_col {
                let raw = record.get(c).unwrap_or_default();
                responses.push(self.parse_label(&self.path, raw, row_index)?);
            }
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        Ok((feature_names, rows, responses))
    }

    /// Read one label per row from the first column of `labels_path`.
    fn read_labels_file(&self, labels_path: &Path) -> Result<Vec<f64>, IoError> {
        let mut rdr = self.open(labels_path)?;
        let mut labels = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(labels_path, e))?;
            let raw = record.get(0).unwrap_or_default();
            labels.push(self.parse_label(labels_path, raw, row_index)?);
        }
        debug!(n_labels = labels.len(), labels_path = %labels_path.display(), "read labels file");
        Ok(labels)
    }

    fn open(&self, path: &Path) -> Result<csv::Reader<File>, IoError> {
        let file = File::open(path).map_err(|e| IoError::FileNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file))
    }

    fn parse_feature(&self, raw: &str, row_index: usize, col_index: usize) -> Result<f64, IoError> {
        let non_finite = || IoError::NonFiniteValue {
            path: self.path.clone(),
            row_index,
            col_index,
            raw: raw.to_string(),
        };
        let value: f64 = raw.parse().map_err(|_| non_finite())?;
        if !value.is_finite() {
            return Err(non_finite());
        }
        Ok(value)
    }

    fn parse_label(&self, path: &Path, raw: &str, row_index: usize) -> Result<f64, IoError> {
        if let Some(positive) = &self.positive_label {
            return Ok(if raw == positive { 1.0 } else { 0.0 });
        }
        match raw.parse::<f64>() {
            Ok(value) if value == 0.0 || value == 1.0 => Ok(value),
            _ => Err(IoError::InvalidLabel {
                path: path.to_path_buf(),
                row_index,
                raw: raw.to_string(),
            }),
        }
    }
}

fn csv_error(path: &Path, e: csv::Error) -> IoError {
    IoError::CsvParse {
        path: path.to_path_buf(),
        offset: e.position().map_or(0, |p| p.byte()),
        source: e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_label_in_last_column() {
        let f = write_csv("width,height,label\n1.0,5.0,0\n2.0,4.0,0\n3.0,3.0,1\n8.0,1.0,1\n");
        let ds = DatasetReader::new(f.path()).read().unwrap();
        assert_eq!(ds.n_samples(), 4);
        assert_eq!(ds.feature_names(), &["width", "height"]);
        assert_eq!(ds.rows()[3], vec![8.0, 1.0]);
        assert_eq!(ds.responses(), &[0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn read_token_labels_without_header() {
        // id, diagnosis, features...
        let f = write_csv("842302,M,17.99,10.38\n842517,B,20.57,17.77\n84300903,M,19.69,21.25\n");
        let ds = DatasetReader::new(f.path())
            .with_headers(false)
            .with_label_column(LabelColumn::Index(1))
            .with_positive_label("M")
            .with_ignored_columns(vec![0])
            .read()
            .unwrap();
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.feature_names(), &["f0", "f1"]);
        assert_eq!(ds.responses(), &[1.0, 0.0, 1.0]);
        assert_eq!(ds.rows()[1], vec![20.57, 17.77]);
    }

    #[test]
    fn read_separate_labels_file() {
        let x = write_csv("5.1,3.5\n4.9,3.0\n6.2,2.9\n");
        let y = write_csv("0\n0\n1\n");
        let ds = DatasetReader::new(x.path())
            .with_headers(false)
            .with_labels_file(y.path())
            .read()
            .unwrap();
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.responses(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn read_features_without_labels() {
        let f = write_csv("id,width,height\n7,1.0,5.0\n8,2.0,4.0\n9,8.0,1.0\n");
        let fs = DatasetReader::new(f.path())
            .with_label_column(LabelColumn::Last)
            .with_ignored_columns(vec![0])
            .read_features()
            .unwrap();
        assert_eq!(fs.n_samples(), 3);
        assert_eq!(fs.feature_names(), &["width", "height"]);
        assert_eq!(fs.rows()[2], vec![8.0, 1.0]);
    }

    #[test]
    fn read_features_ignores_labels_file() {
        let x = write_csv("5.1,3.5\n4.9,3.0\n");
        let fs = DatasetReader::new(x.path())
            .with_headers(false)
            .with_labels_file(Path::new("/nonexistent/labels.csv"))
            .read_features()
            .unwrap();
        assert_eq!(fs.n_features(), 2);
        assert_eq!(fs.into_rows(), vec![vec![5.1, 3.5], vec![4.9, 3.0]]);
    }

    #[test]
    fn label_count_mismatch_error() {
        let x = write_csv("5.1,3.5\n4.9,3.0\n");
        let y = write_csv("0\n");
        let err = DatasetReader::new(x.path())
            .with_headers(false)
            .with_labels_file(y.path())
            .read()
            .unwrap_err();
        assert!(matches!(
            err,
            IoError::LabelCountMismatch {
                n_rows: 2,
                n_labels: 1,
                ..
            }
        ));
    }

    #[test]
    fn invalid_numeric_label_error() {
        let f = write_csv("a,label\n1.0,0\n2.0,2\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InvalidLabel { row_index: 1, .. }));
    }

    #[test]
    fn missing_label_column_error() {
        let f = write_csv("a,b\n1.0,0\n");
        let err = DatasetReader::new(f.path())
            .with_label_column(LabelColumn::Index(5))
            .read()
            .unwrap_err();
        assert!(matches!(
            err,
            IoError::MissingLabelColumn {
                column: 5,
                n_columns: 2,
                ..
            }
        ));
    }

    #[test]
    fn empty_dataset_error() {
        let f = write_csv("a,b,label\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn no_feature_columns_error() {
        let f = write_csv("id,label\nx,0\n");
        let err = DatasetReader::new(f.path())
            .with_ignored_columns(vec![0])
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::NoFeatureColumns { .. }));
    }

    #[test]
    fn inconsistent_row_length_error() {
        let f = write_csv("a,b,label\n1.0,2.0,0\n1.0,1\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InconsistentRowLength {
                row_index: 1,
                expected: 3,
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn non_finite_value_error() {
        let f = write_csv("a,label\nNaN,0\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::NonFiniteValue { col_index: 0, .. }));
    }

    #[test]
    fn unparseable_value_error() {
        let f = write_csv("a,label\nabc,1\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::NonFiniteValue { .. }));
    }

    #[test]
    fn file_not_found_error() {
        let err = DatasetReader::new(Path::new("/nonexistent/data.csv"))
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
