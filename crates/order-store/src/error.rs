use domain::AreaCodeError;
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
///
/// `InvalidArgument` is a caller-contract violation. Every other variant is a
/// storage failure; see [`StoreError::is_storage_failure`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller passed a malformed area identifier.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] AreaCodeError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into the domain model.
    #[error("Corrupt value in column {column}: {reason}")]
    CorruptRow { column: String, reason: String },

    /// A batch write affected fewer rows than it was given.
    #[error("Incomplete write to {table}: expected {expected} rows, wrote {actual}")]
    IncompleteWrite {
        table: &'static str,
        expected: u64,
        actual: u64,
    },

    /// A failure injected by the in-memory store.
    #[error("Injected failure during {0}")]
    InjectedFailure(&'static str),
}

impl StoreError {
    /// Returns true for failures originating in the backing store.
    pub fn is_storage_failure(&self) -> bool {
        !matches!(self, StoreError::InvalidArgument(_))
    }

    pub(crate) fn corrupt(column: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        StoreError::CorruptRow {
            column: column.into(),
            reason: reason.to_string(),
        }
    }
}

/// Logs a database failure for `operation` and converts it.
pub(crate) fn storage_failure(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| {
        tracing::error!(operation, error = %err, "storage failure");
        StoreError::Database(err)
    }
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
