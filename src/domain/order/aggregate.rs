use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::commands::{CreateOrder, UpdateOrder};
use super::errors::OrderError;
use super::value_objects::{check_price, LineItem, OrderId, OrderStatus, MAX_AMOUNT};

// ============================================================================
// Order - the persisted entity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: OrderId,

    // Content
    pub table_number: i32,
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub status: OrderStatus,

    // Audit Trail
    pub created_at: DateTime<Utc>,
}

/// Sum of all item prices, bounded by [`MAX_AMOUNT`]
pub fn compute_total(items: &[LineItem]) -> Result<Decimal, OrderError> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.price))
        .filter(|total| *total <= MAX_AMOUNT)
        .ok_or(OrderError::TotalTooLarge)
}

pub fn validate_table_number(table_number: i32) -> Result<(), OrderError> {
    if table_number <= 0 {
        return Err(OrderError::InvalidTableNumber(table_number.to_string()));
    }
    Ok(())
}

pub fn validate_items(items: &[LineItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::EmptyItems);
    }

    for item in items {
        if item.name.trim().is_empty() {
            return Err(OrderError::EmptyItemName);
        }
        check_price(item.price)?;
    }

    Ok(())
}

impl Order {
    /// Check every stored-entity invariant. Never mutates.
    pub fn validate(&self) -> Result<(), OrderError> {
        validate_table_number(self.table_number)?;
        validate_items(&self.items)?;
        if self.total_price > MAX_AMOUNT {
            return Err(OrderError::TotalTooLarge);
        }
        Ok(())
    }

    /// Apply a partial update to a copy of this order.
    ///
    /// The total is recomputed whenever items are replaced. The result is
    /// validated before it is handed back, so the caller can commit it as is.
    pub fn apply(&self, changes: &UpdateOrder) -> Result<Order, OrderError> {
        let mut updated = self.clone();

        if let Some(table_number) = changes.table_number {
            updated.table_number = table_number;
        }
        if let Some(items) = &changes.items {
            updated.items = items.clone();
            updated.total_price = compute_total(&updated.items)?;
        }
        if let Some(status) = changes.status {
            updated.status = status;
        }

        updated.validate()?;
        Ok(updated)
    }
}

/// Two orders are the same entity iff they share an id.
impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order #{} - table {}", self.id, self.table_number)
    }
}

// ============================================================================
// NewOrder - validated order waiting for an id
// ============================================================================

/// Order content that passed validation but has not been stored yet.
///
/// Only [`NewOrder::from_command`] builds one, so a `NewOrder` always carries
/// a total that matches its items.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_number: i32,
    pub items: Vec<LineItem>,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn from_command(command: CreateOrder, created_at: DateTime<Utc>) -> Result<Self, OrderError> {
        validate_table_number(command.table_number)?;
        validate_items(&command.items)?;

        Ok(Self {
            total_price: compute_total(&command.items)?,
            table_number: command.table_number,
            items: command.items,
            status: command.status,
            created_at,
        })
    }

    /// Attach the store-assigned id
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            table_number: self.table_number,
            items: self.items,
            total_price: self.total_price,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
