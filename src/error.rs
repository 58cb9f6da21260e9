use thiserror::Error;

/// Error type shared by every stage of a bake-off run
#[derive(Error, Debug)]
pub enum Error {
    /// The source table is missing or cannot be read
    #[error("Cannot read data source '{path}': {reason}")]
    DataAccess { path: String, reason: String },

    /// The requested target column is not part of the table
    #[error("'{name}' is not a valid target column. Please choose one of: {available:?}")]
    InvalidTarget { name: String, available: Vec<String> },

    /// The declared task kind does not fit the data
    #[error("Data is not ready for the {task} task ({reason}). Offending columns: {columns:?}")]
    TaskDataMismatch {
        task: String,
        reason: String,
        columns: Vec<String>,
    },

    /// A user supplied value could not be parsed
    #[error("Invalid input: {0}")]
    InputParse(String),

    #[error("CSV error")]
    Csv(#[source] csv::Error),

    #[error("I/O error")]
    Io(#[source] std::io::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("TOML error: {0}")]
    Toml(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Model has not been fitted yet: {0}")]
    NotFitted(String),
}

pub type BakeoffError = Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl Error {
    /// True for errors that halt a run before any candidate is fit
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::DataAccess { .. }
                | Error::InvalidTarget { .. }
                | Error::TaskDataMismatch { .. }
                | Error::Csv(_)
                | Error::EmptyData(_)
        )
    }
}
