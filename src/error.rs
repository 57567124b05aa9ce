use thiserror::Error;

/// Failures surfaced by the student records engine.
///
/// Validation problems never reach the store; everything below the store
/// boundary is reported as-is, without retries.
#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("{}", .0.join("\n"))]
    ValidationFailed(Vec<String>),

    #[error("student {0} already exists")]
    DuplicateKey(String),

    #[error("student {0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GPA threshold must be a finite number, got {0}")]
    InvalidThreshold(f64),
}

impl RecordsError {
    /// Stable code used on the IPC wire.
    pub fn code(&self) -> &'static str {
        match self {
            RecordsError::ValidationFailed(_) => "validation_failed",
            RecordsError::DuplicateKey(_) => "duplicate_key",
            RecordsError::NotFound(_) => "not_found",
            RecordsError::Database(_) => "db_query_failed",
            RecordsError::Io(_) => "io_failed",
            RecordsError::Csv(_) => "csv_failed",
            RecordsError::InvalidThreshold(_) => "bad_params",
        }
    }

    /// True for failures originating below the store boundary.
    pub fn is_store_error(&self) -> bool {
        matches!(self, RecordsError::Database(_) | RecordsError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, RecordsError>;
