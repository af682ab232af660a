use thiserror::Error;

/// Errors raised by the load → describe → filter → chart → export pipeline.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The byte stream is not valid for the declared format.
    #[error("Failed to parse {format} input: {message}")]
    Parse { format: String, message: String },

    /// No data rows remain after header extraction.
    #[error("Table has no data rows")]
    EmptyTable,

    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    #[error("Column '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Table has {rows} data rows, more than the limit of {limit}")]
    RowLimitExceeded { rows: usize, limit: usize },

    /// A table was assembled with unequal column lengths or duplicate names.
    #[error("Invalid table: {0}")]
    InvalidTable(String),
}

impl DashboardError {
    pub(crate) fn parse(format: impl ToString, message: impl ToString) -> Self {
        DashboardError::Parse {
            format: format.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
