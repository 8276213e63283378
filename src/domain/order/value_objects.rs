use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Store-assigned order identity
pub type OrderId = i64;

/// Largest price or total a `NUMERIC(10, 2)` column holds: 99999999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x540B_E3FF, 0x2, 0, false, 2);

/// A price must be positive and fit the stored precision
pub fn check_price(price: Decimal) -> Result<(), OrderError> {
    if price <= Decimal::ZERO || price > MAX_AMOUNT {
        return Err(OrderError::InvalidPrice { price });
    }
    Ok(())
}

/// One ordered dish
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LineItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Order status. Any status may be set to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Ready,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, OrderStatus::Paid)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "ready" => Ok(OrderStatus::Ready),
            "paid" => Ok(OrderStatus::Paid),
            other => Err(OrderError::InvalidStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
