//! Error types for the Aurelion analytics library.
//!
//! All failures surface as [`AurelionError`]. The three domain conditions a
//! caller has to react to are kept as distinct variants so they can never be
//! confused with an empty result:
//!
//! - [`AurelionError::MissingSource`]: a table's file is absent and no
//!   alternative has been supplied yet.
//! - [`AurelionError::LoadFailure`]: data was found but could not be parsed.
//! - [`AurelionError::SchemaMismatch`]: a column an aggregation needs is absent.

use thiserror::Error;

/// The main error type for the Aurelion library.
#[derive(Error, Debug)]
pub enum AurelionError {
    /// The default location of a table holds no data and nothing else was supplied.
    #[error("No data for table '{table}': '{location}' does not exist")]
    MissingSource {
        /// Logical table name (e.g. "sales")
        table: String,
        /// Location that was tried
        location: String,
    },

    /// Data was found but could not be parsed into a table.
    #[error("Failed to load table '{table}' from '{location}': {message}")]
    LoadFailure {
        /// Logical table name
        table: String,
        /// Location that was tried
        location: String,
        /// Parser diagnostic
        message: String,
    },

    /// A column required by an aggregation is absent from a table.
    #[error("Table '{table}' has no column '{column}'")]
    SchemaMismatch {
        /// Logical table name
        table: String,
        /// The missing column
        column: String,
    },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while writing formatted output.
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error related to configuration or API misuse.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An identifier was rejected before being placed in generated SQL.
    #[error("Security error: {0}")]
    SecurityError(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, AurelionError>`.
pub type Result<T> = std::result::Result<T, AurelionError>;

impl AurelionError {
    /// Creates a missing-source error.
    pub fn missing_source(table: impl Into<String>, location: impl Into<String>) -> Self {
        Self::MissingSource {
            table: table.into(),
            location: location.into(),
        }
    }

    /// Creates a load failure error.
    pub fn load_failure(
        table: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::LoadFailure {
            table: table.into(),
            location: location.into(),
            message: message.into(),
        }
    }

    /// Creates a schema mismatch error.
    pub fn schema_mismatch(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Returns the logical table this error is about, if any.
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::MissingSource { table, .. }
            | Self::LoadFailure { table, .. }
            | Self::SchemaMismatch { table, .. } => Some(table),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AurelionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AurelionError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            // Domain errors already name their table and column.
            err @ (AurelionError::MissingSource { .. }
            | AurelionError::LoadFailure { .. }
            | AurelionError::SchemaMismatch { .. }) => err,
            AurelionError::Internal(inner) => AurelionError::Internal(format!("{}: {inner}", f())),
            other => AurelionError::Internal(format!("{}: {other}", f())),
        })
    }
}
