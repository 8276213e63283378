// ============================================================================
// Order Store - persistence seam
// ============================================================================
//
// The command handler only talks to `dyn OrderStore`. Two backends:
// - in_memory/ - process-local map, used for development and every test
// - postgres/  - sqlx + PostgreSQL, used when DATABASE_URL is set
//
// Each write is a single atomic unit in its backend. Validation happens
// before the store is called; the store never sees an invalid order.
//
// ============================================================================

mod in_memory;
mod postgres;

pub use in_memory::InMemoryOrderStore;
pub use postgres::{connect_pool, ensure_schema, PgOrderStore};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::order::{NewOrder, Order, OrderId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored order #{id} is corrupt: {reason}")]
    Corrupt { id: OrderId, reason: String },

    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    #[error("revenue total does not fit a decimal")]
    RevenueOverflow,
}

/// Narrowing applied by [`OrderStore::list`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderFilter {
    #[default]
    All,
    TableNumber(i64),
    Status(String),
}

impl OrderFilter {
    /// Interpret the single `q` token of the order list.
    ///
    /// All digits means a table number, anything else is compared with the
    /// status token. Digit strings too long for `i64` fall through to the
    /// status branch, where they match nothing.
    pub fn from_token(token: Option<&str>) -> Self {
        let token = match token.map(str::trim) {
            None | Some("") => return OrderFilter::All,
            Some(token) => token,
        };

        if token.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(table_number) = token.parse::<i64>() {
                return OrderFilter::TableNumber(table_number);
            }
        }

        OrderFilter::Status(token.to_string())
    }

    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::TableNumber(table_number) => i64::from(order.table_number) == *table_number,
            OrderFilter::Status(status) => order.status.as_str() == status,
        }
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Assign an id and persist
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Overwrite every mutable column. Returns false if the id is unknown.
    async fn update(&self, order: &Order) -> Result<bool, StoreError>;

    /// Returns false if the id is unknown
    async fn delete(&self, id: OrderId) -> Result<bool, StoreError>;

    /// Matching orders, newest first
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// Sum of `total_price` over paid orders, zero when there are none
    async fn revenue_total(&self) -> Result<Decimal, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}
