//! Registry error types.

use order_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A directory or order store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The database could not be reached.
    #[error("Failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),
}

impl RegistryError {
    /// Returns true if the caller supplied a bad argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, RegistryError::Store(StoreError::InvalidArgument(_)))
    }
}
