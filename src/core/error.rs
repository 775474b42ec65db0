/// DataTier Error Module
///
/// Error types for the data tier. Driver failures are wrapped in
/// `DriverError`; the public operations surface them as `DataTierError`,
/// tagged with the kind of operation that failed.
use thiserror::Error;

/// Failure reported by the underlying database driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Errors from the SQLite backend
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Errors from any other backend
    #[error("{0}")]
    Other(String),
}

/// Error type for every public data tier operation.
///
/// Zero rows and zero affected rows are never reported through this type;
/// they are ordinary successful results.
#[derive(Error, Debug)]
pub enum DataTierError {
    /// The database session could not be established
    #[error("Connection error: {0}")]
    Connection(#[source] DriverError),

    /// A read failed (malformed SQL or execution failure)
    #[error("Query error: {0}")]
    Query(#[source] DriverError),

    /// A write failed. The pending transaction was rolled back first;
    /// `rollback` holds the rollback's own failure, if it had one.
    #[error("Action error: {source}")]
    Action {
        #[source]
        source: DriverError,
        rollback: Option<DriverError>,
    },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DataTierError {
    /// The driver error underneath a connection, query or action failure.
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            DataTierError::Connection(e) | DataTierError::Query(e) => Some(e),
            DataTierError::Action { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Type alias for Result to use DataTierError as the error type.
pub type Result<T> = std::result::Result<T, DataTierError>;
