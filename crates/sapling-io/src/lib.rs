//! CSV loading and validation for binary classification datasets.

mod domain;
mod error;
mod reader;

pub use domain::{Dataset, FeatureSet};
pub use error::IoError;
pub use reader::{DatasetReader, LabelColumn};
