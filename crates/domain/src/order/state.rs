//! Order workflow status.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The workflow status of a student order.
///
/// Status transitions:
/// ```text
/// Start ──► Checked
/// ```
///
/// The store persists the ordinal (`Start` = 0, `Checked` = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order has been submitted and awaits checking.
    #[default]
    Start,

    /// Order has been checked by downstream processing.
    Checked,
}

impl OrderStatus {
    /// Returns the stored ordinal.
    pub fn as_i32(&self) -> i32 {
        match self {
            OrderStatus::Start => 0,
            OrderStatus::Checked => 1,
        }
    }

    /// Decodes a stored ordinal.
    pub fn from_i32(value: i32) -> Result<Self, DomainError> {
        match value {
            0 => Ok(OrderStatus::Start),
            1 => Ok(OrderStatus::Checked),
            other => Err(DomainError::UnknownStatus(other)),
        }
    }

    /// Returns true while the order still awaits processing.
    pub fn is_pending(&self) -> bool {
        matches!(self, OrderStatus::Start)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Start => "Start",
            OrderStatus::Checked => "Checked",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
