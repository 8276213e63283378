//! PostgreSQL order store using sqlx.
//!
//! # Schema
//!
//! One `orders` table. `items` is a JSONB list of `{name, price}` objects in
//! the order they were entered; every other field has its own column.
//! `total_price` is stored next to the items rather than summed on read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::{OrderFilter, OrderStore, StoreError};
use crate::domain::order::{LineItem, NewOrder, Order, OrderId, OrderStatus};

const SELECT_COLUMNS: &str = "SELECT id, table_number, items, total_price, status, created_at FROM orders";
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

/// Open a connection pool
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create the `orders` table and its indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id BIGSERIAL PRIMARY KEY,
            table_number INTEGER NOT NULL CHECK (table_number > 0),
            items JSONB NOT NULL,
            total_price NUMERIC(10, 2) NOT NULL DEFAULT 0,
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_table_number ON orders (table_number)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders (created_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}

#[derive(Clone, Debug)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
        let id: OrderId = row.try_get("id")?;
        let status_token: String = row.try_get("status")?;
        let status = status_token
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::Corrupt {
                id,
                reason: e.to_string(),
            })?;
        let Json(items): Json<Vec<LineItem>> = row.try_get("items")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(Order {
            id,
            table_number: row.try_get("table_number")?,
            items,
            total_price: row.try_get("total_price")?,
            status,
            created_at,
        })
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let id: OrderId = sqlx::query_scalar(
            "INSERT INTO orders (table_number, items, total_price, status, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(order.table_number)
        .bind(Json(&order.items))
        .bind(order.total_price)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(order.into_order(id))
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::order_from_row).transpose()
    }

    async fn update(&self, order: &Order) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE orders
             SET table_number = $1, items = $2, total_price = $3, status = $4
             WHERE id = $5",
        )
        .bind(order.table_number)
        .bind(Json(&order.items))
        .bind(order.total_price)
        .bind(order.status.as_str())
        .bind(order.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: OrderId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let rows = match filter {
            OrderFilter::All => {
                sqlx::query(&format!("{SELECT_COLUMNS} {NEWEST_FIRST}"))
                    .fetch_all(&self.pool)
                    .await?
            }
            OrderFilter::TableNumber(table_number) => {
                sqlx::query(&format!("{SELECT_COLUMNS} WHERE table_number = $1 {NEWEST_FIRST}"))
                    .bind(*table_number)
                    .fetch_all(&self.pool)
                    .await?
            }
            OrderFilter::Status(status) => {
                sqlx::query(&format!("{SELECT_COLUMNS} WHERE status = $1 {NEWEST_FIRST}"))
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(Self::order_from_row).collect()
    }

    async fn revenue_total(&self) -> Result<Decimal, StoreError> {
        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE status = $1",
        )
        .bind(OrderStatus::Paid.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
