//! Error types for loading records and playing a round

use std::path::PathBuf;
use thiserror::Error;

/// Errors while turning a data source into a record store
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read data file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open workbook {path}: {reason}")]
    Workbook { path: PathBuf, reason: String },

    #[error("workbook {path} has no worksheets")]
    NoWorksheet { path: PathBuf },

    #[error("unsupported data file {path} (expected .xlsx, .xls, .ods or .tsv)")]
    UnsupportedFormat { path: PathBuf },

    #[error("{source_name} has no header row")]
    MissingHeader { source_name: String },

    #[error("{source_name} has no '{column}' column")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name} contains no usable records")]
    Empty { source_name: String },

    #[error("loading {source_name} was interrupted")]
    Interrupted { source_name: String },
}

/// Picking a target needs at least one record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("cannot pick a target from an empty record store")]
    EmptyStore,
}

/// A submitted name that matches no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no record named '{name}'")]
pub struct NotFoundError {
    pub name: String,
}
