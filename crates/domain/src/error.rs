//! Domain error types.

use thiserror::Error;

use crate::area::AreaCodeError;

/// Errors raised while building or decoding domain values.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An area code could not be interpreted.
    #[error("Area code error: {0}")]
    AreaCode(#[from] AreaCodeError),

    /// A stored workflow status ordinal has no matching variant.
    #[error("Unknown order status: {0}")]
    UnknownStatus(i32),
}
