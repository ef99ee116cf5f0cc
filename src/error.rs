use thiserror::Error;

/// Errors raised by the loading, summary and chart-building layers.
///
/// Every variant is scoped to a single interaction: the UI reports it and
/// keeps showing whatever it displayed before.
#[derive(Debug, Error)]
pub enum ExploreError {
    #[error("could not parse dataset: {0}")]
    Parse(String),

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{0}' has no valid values")]
    EmptyColumn(String),

    #[error("column '{column}' is not {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ExploreError> = std::result::Result<T, E>;

impl ExploreError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ExploreError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
