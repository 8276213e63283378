use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::OrderError;
use super::items_text::parse_items_text;
use super::value_objects::{LineItem, OrderStatus};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub table_number: i32,
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
}

/// Partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    pub table_number: Option<i32>,
    pub items: Option<Vec<LineItem>>,
    pub status: Option<OrderStatus>,
}

impl UpdateOrder {
    pub fn touches_items(&self) -> bool {
        self.items.is_some()
    }
}

// ============================================================================
// Raw form fields
// ============================================================================

/// Field values exactly as they arrive from an HTML form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOrderFields {
    pub table_number: Option<String>,
    pub status: Option<String>,
    pub items_text: Option<String>,
}

impl RawOrderFields {
    /// Table number and items are required; status defaults to pending.
    pub fn to_create_command(&self) -> Result<CreateOrder, OrderError> {
        let table_number = parse_table_number(self.table_number.as_deref().unwrap_or(""))?;
        let items = parse_items_text(self.items_text.as_deref().unwrap_or(""))?;
        let status = parse_optional_status(self.status.as_deref())?.unwrap_or_default();

        Ok(CreateOrder {
            table_number,
            items,
            status,
        })
    }

    /// Missing fields are left unchanged; present ones must be valid.
    pub fn to_update_command(&self) -> Result<UpdateOrder, OrderError> {
        let table_number = self
            .table_number
            .as_deref()
            .map(parse_table_number)
            .transpose()?;
        let items = self.items_text.as_deref().map(parse_items_text).transpose()?;
        let status = parse_optional_status(self.status.as_deref())?;

        Ok(UpdateOrder {
            table_number,
            items,
            status,
        })
    }
}

/// Accepts only plain digits; signs, blanks and overflow are rejected.
pub fn parse_table_number(raw: &str) -> Result<i32, OrderError> {
    let trimmed = raw.trim();
    let invalid = || OrderError::InvalidTableNumber(raw.to_string());

    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    match trimmed.parse::<i32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid()),
    }
}

fn parse_optional_status(raw: Option<&str>) -> Result<Option<OrderStatus>, OrderError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(token) => token.parse().map(Some),
    }
}

// ============================================================================
// JSON payloads
// ============================================================================

/// Full order body for create and replace.
///
/// A missing or non-numeric `table_number` is `InvalidTableNumber`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(default)]
    pub table_number: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Partial order body; absent (or null) fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default)]
    pub table_number: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
}

impl OrderPayload {
    pub fn to_create_command(&self) -> Result<CreateOrder, OrderError> {
        Ok(CreateOrder {
            table_number: table_number_from_json(self.table_number.as_ref())?,
            items: round_prices(&self.items),
            status: parse_optional_status(self.status.as_deref())?.unwrap_or_default(),
        })
    }

    /// Replace every field; a missing status resets to pending.
    pub fn to_replace_command(&self) -> Result<UpdateOrder, OrderError> {
        let create = self.to_create_command()?;
        Ok(UpdateOrder {
            table_number: Some(create.table_number),
            items: Some(create.items),
            status: Some(create.status),
        })
    }
}

impl OrderPatch {
    pub fn to_update_command(&self) -> Result<UpdateOrder, OrderError> {
        Ok(UpdateOrder {
            table_number: self
                .table_number
                .as_ref()
                .map(|value| table_number_from_json(Some(value)))
                .transpose()?,
            items: self.items.as_deref().map(round_prices),
            status: parse_optional_status(self.status.as_deref())?,
        })
    }
}

/// Integers and digit strings are accepted, like form input.
fn table_number_from_json(value: Option<&Value>) -> Result<i32, OrderError> {
    match value {
        None | Some(Value::Null) => Err(OrderError::InvalidTableNumber(String::new())),
        Some(Value::String(raw)) => parse_table_number(raw),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| OrderError::InvalidTableNumber(number.to_string())),
        Some(other) => Err(OrderError::InvalidTableNumber(other.to_string())),
    }
}

/// Structured prices are kept to whole cents, like prices typed as text.
fn round_prices(items: &[LineItem]) -> Vec<LineItem> {
    items
        .iter()
        .map(|item| {
            let price = item
                .price
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            LineItem::new(item.name.trim(), price)
        })
        .collect()
}
