use std::path::PathBuf;

use thiserror::Error;

use super::model::Facet;

/// The source could not be read or does not contain a usable sales sheet.
/// Fatal: no partial dataset is ever returned alongside it.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("sheet '{0}' not found in workbook")]
    MissingSheet(String),
    #[error("required column '{0}' not found")]
    MissingColumn(String),
    #[error("row {row}: '{value}' in column '{column}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: String },
    #[error("row {row}: '{value}' is not a time of day (expected HH:MM:SS)")]
    InvalidTime { row: usize, value: String },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// The filter predicate could not be evaluated. Recoverable: the pipeline
/// substitutes an empty selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("'{value}' is not a known {facet} value")]
    UnknownValue { facet: Facet, value: String },
}
