use rust_decimal::Decimal;

use super::value_objects::{OrderId, MAX_AMOUNT};
use crate::store::StoreError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

/// Example line shown to the user next to a malformed line
pub const ITEM_LINE_HINT: &str = "expected '<name> <price>', e.g. 'Pizza 450.50'";

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid line format: '{line}' ({hint})", hint = ITEM_LINE_HINT)]
    MalformedLine { line: String },

    #[error("Item price must be greater than 0 and at most {max}, got {price}", max = MAX_AMOUNT)]
    InvalidPrice { price: Decimal },

    #[error("Order total cannot exceed {max}", max = MAX_AMOUNT)]
    TotalTooLarge,

    #[error("Request body is not a valid order: {0}")]
    MalformedBody(String),

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Item name cannot be empty")]
    EmptyItemName,

    #[error("Table number must be a whole number greater than 0, got '{0}'")]
    InvalidTableNumber(String),

    #[error("Unknown order status: '{0}' (expected pending, ready or paid)")]
    InvalidStatus(String),

    #[error("Order #{0} not found")]
    NotFound(OrderId),

    #[error("Order storage failed: {0}")]
    Storage(#[from] StoreError),
}

impl OrderError {
    /// Input the caller can correct and resubmit
    pub fn is_validation(&self) -> bool {
        match self {
            OrderError::MalformedLine { .. }
            | OrderError::InvalidPrice { .. }
            | OrderError::TotalTooLarge
            | OrderError::MalformedBody(_)
            | OrderError::EmptyItems
            | OrderError::EmptyItemName
            | OrderError::InvalidTableNumber(_)
            | OrderError::InvalidStatus(_) => true,
            OrderError::NotFound(_) | OrderError::Storage(_) => false,
        }
    }

    /// Stable machine-readable code, also used as a metrics label
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::MalformedLine { .. } => "malformed_line",
            OrderError::InvalidPrice { .. } => "invalid_price",
            OrderError::TotalTooLarge => "total_too_large",
            OrderError::MalformedBody(_) => "malformed_body",
            OrderError::EmptyItems => "empty_items",
            OrderError::EmptyItemName => "empty_item_name",
            OrderError::InvalidTableNumber(_) => "invalid_table_number",
            OrderError::InvalidStatus(_) => "invalid_status",
            OrderError::NotFound(_) => "not_found",
            OrderError::Storage(_) => "storage_error",
        }
    }

    /// Input field the error belongs to, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            OrderError::MalformedLine { .. }
            | OrderError::InvalidPrice { .. }
            | OrderError::TotalTooLarge
            | OrderError::EmptyItems
            | OrderError::EmptyItemName => Some("items"),
            OrderError::InvalidTableNumber(_) => Some("table_number"),
            OrderError::InvalidStatus(_) => Some("status"),
            OrderError::MalformedBody(_) | OrderError::NotFound(_) | OrderError::Storage(_) => None,
        }
    }
}
