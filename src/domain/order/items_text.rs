//! Line-based item text: one `<name> <price>` per line.
//!
//! This is the format waiters type into the order form:
//!
//! ```text
//! борщ 100
//! Cappuccino large 4.50
//! ```
//!
//! Parsing is all-or-nothing. The first line that does not fit the format
//! aborts the whole block, so a half-parsed order can never reach the store.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

use super::errors::OrderError;
use super::value_objects::{check_price, LineItem};

fn item_line_regex() -> &'static Regex {
    static ITEM_LINE: OnceLock<Regex> = OnceLock::new();
    ITEM_LINE.get_or_init(|| {
        Regex::new(r"^(.+?)\s+(\d+(?:\.\d{1,2})?)$").expect("item line pattern is valid")
    })
}

/// Parse a block of item text into line items, preserving line order.
///
/// Blank lines are skipped. An empty block yields an empty vector; rejecting
/// an order without items is the entity's job, not the parser's.
pub fn parse_items_text(text: &str) -> Result<Vec<LineItem>, OrderError> {
    let mut items = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        items.push(parse_item_line(raw_line, line)?);
    }

    Ok(items)
}

fn parse_item_line(raw_line: &str, line: &str) -> Result<LineItem, OrderError> {
    let malformed = || OrderError::MalformedLine {
        line: raw_line.to_string(),
    };

    let captures = item_line_regex().captures(line).ok_or_else(malformed)?;
    let name = captures[1].trim();
    let price = Decimal::from_str(&captures[2]).map_err(|_| malformed())?;

    check_price(price)?;

    Ok(LineItem::new(name, price))
}

/// Render items back into the text form accepted by [`parse_items_text`].
pub fn render_items_text(items: &[LineItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} {}", item.name, item.price.normalize()))
        .collect::<Vec<_>>()
        .join("\n")
}
