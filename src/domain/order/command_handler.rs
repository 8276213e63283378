use chrono::Utc;
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::health::{ComponentHealth, HealthStatus};
use crate::metrics::Metrics;
use crate::store::{OrderFilter, OrderStore, StoreError};

use super::aggregate::{NewOrder, Order};
use super::commands::{CreateOrder, UpdateOrder};
use super::errors::OrderError;
use super::value_objects::OrderId;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Validation → Order → Store
//
// Every write validates first and commits second, so a rejected command
// never reaches the store.
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn OrderStore>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn OrderStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Validate, compute the total and persist a new order
    pub async fn create(&self, command: CreateOrder) -> Result<Order, OrderError> {
        let draft = NewOrder::from_command(command, Utc::now()).map_err(|e| self.rejected(e))?;

        let order = self.timed("insert", self.store.insert(draft)).await?;
        self.metrics.orders_created.inc();

        tracing::info!(
            order_id = order.id,
            table_number = order.table_number,
            item_count = order.items.len(),
            total_price = %order.total_price,
            status = %order.status,
            "Order created"
        );

        Ok(order)
    }

    pub async fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        tracing::debug!(order_id = id, "Loading order");

        self.timed("get", self.store.get(id))
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// Apply a partial update; the total is recomputed when items change
    pub async fn update(&self, id: OrderId, changes: UpdateOrder) -> Result<Order, OrderError> {
        let current = self.get(id).await?;
        let updated = current.apply(&changes).map_err(|e| self.rejected(e))?;

        if !self.timed("update", self.store.update(&updated)).await? {
            // Deleted between read and write
            return Err(OrderError::NotFound(id));
        }
        self.metrics.orders_updated.inc();

        tracing::info!(
            order_id = id,
            items_changed = changes.touches_items(),
            total_price = %updated.total_price,
            status = %updated.status,
            "Order updated"
        );

        Ok(updated)
    }

    pub async fn delete(&self, id: OrderId) -> Result<(), OrderError> {
        if !self.timed("delete", self.store.delete(id)).await? {
            return Err(OrderError::NotFound(id));
        }
        self.metrics.orders_deleted.inc();

        tracing::info!(order_id = id, "Order deleted");
        Ok(())
    }

    /// Orders matching the filter, newest first
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError> {
        let orders = self.timed("list", self.store.list(filter)).await?;

        tracing::debug!(filter = ?filter, count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Revenue from paid orders; zero when nothing is paid
    pub async fn revenue_total(&self) -> Result<Decimal, OrderError> {
        self.metrics.revenue_queries.inc();
        let total = self.timed("revenue", self.store.revenue_total()).await?;

        tracing::debug!(total_revenue = %total, "Computed revenue");
        Ok(total)
    }

    pub async fn check_health(&self) -> ComponentHealth {
        let name = format!("store:{}", self.store.backend_name());

        match self.store.ping().await {
            Ok(()) => ComponentHealth::new(name, HealthStatus::Healthy),
            Err(e) => {
                tracing::warn!(error = %e, "Order store health check failed");
                ComponentHealth::new(name, HealthStatus::Unhealthy(e.to_string()))
            }
        }
    }

    /// Count and log a rejected submission, handing the error back
    pub fn rejected(&self, error: OrderError) -> OrderError {
        if error.is_validation() {
            self.metrics.record_rejection(error.code());
            tracing::warn!(reason = error.code(), error = %error, "Order submission rejected");
        }
        error
    }

    async fn timed<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        let started = Instant::now();
        let result = call.await;

        self.metrics
            .record_store_operation(operation, started.elapsed().as_secs_f64(), result.is_ok());
        if let Err(e) = &result {
            tracing::error!(operation, error = %e, "Order store operation failed");
        }

        result
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{parse_items_text, LineItem, OrderStatus, RawOrderFields};
    use crate::store::InMemoryOrderStore;

    fn handler() -> OrderCommandHandler {
        OrderCommandHandler::new(
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(Metrics::new().unwrap()),
        )
    }

    fn create(table_number: i32, items: &str, status: OrderStatus) -> CreateOrder {
        CreateOrder {
            table_number,
            items: parse_items_text(items).unwrap(),
            status,
        }
    }

    /// The three orders the list tests work against
    async fn seed(handler: &OrderCommandHandler) -> Vec<Order> {
        let mut orders = Vec::new();
        orders.push(handler.create(create(1, "Пицца 800", OrderStatus::Pending)).await.unwrap());
        orders.push(handler.create(create(2, "Паста 350", OrderStatus::Ready)).await.unwrap());
        orders.push(handler.create(create(3, "Салат 200", OrderStatus::Paid)).await.unwrap());
        orders
    }

    #[tokio::test]
    async fn test_create_returns_id_and_total() {
        let handler = handler();

        let order = handler
            .create(create(4, "борщ 100\nсок 50", OrderStatus::Pending))
            .await
            .unwrap();

        assert_eq!(order.id, 1);
        assert_eq!(order.total_price, Decimal::from(150));
        assert_eq!(order.items[0].name, "борщ");
        assert_eq!(handler.metrics().orders_created.get(), 1);
    }

    #[tokio::test]
    async fn test_round_trip_through_store() {
        let handler = handler();
        let created = handler
            .create(create(2, "flat white 3.50\nкруассан 2.25\nsoup of the day 7", OrderStatus::Ready))
            .await
            .unwrap();

        let loaded = handler.get(created.id).await.unwrap();

        assert_eq!(loaded.items, created.items);
        assert_eq!(loaded.total_price, Decimal::new(1275, 2));
        assert_eq!(
            loaded.items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["flat white", "круассан", "soup of the day"]
        );
    }

    #[tokio::test]
    async fn test_malformed_text_creates_nothing() {
        let handler = handler();
        let fields = RawOrderFields {
            table_number: Some("1".into()),
            status: Some("pending".into()),
            items_text: Some("невалидная строка".into()),
        };

        let err = fields.to_create_command().unwrap_err();

        assert!(matches!(err, OrderError::MalformedLine { .. }));
        assert!(handler.list(&OrderFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_create_is_counted_and_not_stored() {
        let handler = handler();

        let err = handler
            .create(CreateOrder {
                table_number: 0,
                items: vec![LineItem::new("чай", Decimal::from(50))],
                status: OrderStatus::Pending,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InvalidTableNumber(_)));
        assert!(handler.list(&OrderFilter::All).await.unwrap().is_empty());
        assert_eq!(
            handler
                .metrics()
                .order_rejections
                .with_label_values(&["invalid_table_number"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_create_with_empty_items_fails() {
        let handler = handler();

        let err = handler.create(create(1, "", OrderStatus::Pending)).await.unwrap_err();

        assert!(matches!(err, OrderError::EmptyItems));
    }

    #[tokio::test]
    async fn test_status_only_update() {
        let handler = handler();
        let order = handler.create(create(1, "Пицца 800", OrderStatus::Pending)).await.unwrap();

        let updated = handler
            .update(
                order.id,
                UpdateOrder {
                    status: Some(OrderStatus::Ready),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Ready);
        assert_eq!(updated.items, order.items);
        assert_eq!(updated.total_price, Decimal::from(800));
        assert_eq!(updated.created_at, order.created_at);
    }

    #[tokio::test]
    async fn test_items_update_recomputes_total() {
        let handler = handler();
        let order = handler.create(create(1, "Пицца 800", OrderStatus::Pending)).await.unwrap();

        handler
            .update(
                order.id,
                UpdateOrder {
                    table_number: Some(2),
                    items: Some(parse_items_text("Пицца 200\nсок 100").unwrap()),
                    status: Some(OrderStatus::Ready),
                },
            )
            .await
            .unwrap();

        let stored = handler.get(order.id).await.unwrap();
        assert_eq!(stored.table_number, 2);
        assert_eq!(stored.status, OrderStatus::Ready);
        assert_eq!(stored.total_price, Decimal::from(300));
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items[1].price, Decimal::from(100));
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_order_unchanged() {
        let handler = handler();
        let order = handler.create(create(1, "Пицца 800", OrderStatus::Pending)).await.unwrap();

        let err = handler
            .update(
                order.id,
                UpdateOrder {
                    items: Some(vec![]),
                    status: Some(OrderStatus::Paid),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::EmptyItems));
        let stored = handler.get(order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.items, vec![LineItem::new("Пицца", Decimal::from(800))]);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let handler = handler();

        assert!(matches!(handler.get(999).await, Err(OrderError::NotFound(999))));
        assert!(matches!(handler.delete(999).await, Err(OrderError::NotFound(999))));
        assert!(matches!(
            handler.update(999, UpdateOrder::default()).await,
            Err(OrderError::NotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_permanent() {
        let handler = handler();
        let order = handler.create(create(1, "кофе 100", OrderStatus::Pending)).await.unwrap();

        handler.delete(order.id).await.unwrap();

        assert!(matches!(handler.get(order.id).await, Err(OrderError::NotFound(_))));
        assert!(matches!(handler.delete(order.id).await, Err(OrderError::NotFound(_))));
        assert_eq!(handler.metrics().orders_deleted.get(), 1);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let handler = handler();
        seed(&handler).await;

        let all = handler.list(&OrderFilter::from_token(None)).await.unwrap();
        assert_eq!(all.len(), 3);

        let table_one = handler.list(&OrderFilter::from_token(Some("1"))).await.unwrap();
        assert_eq!(table_one.len(), 1);
        assert_eq!(table_one[0].table_number, 1);
        assert_eq!(table_one[0].items[0].name, "Пицца");

        let ready = handler.list(&OrderFilter::from_token(Some("ready"))).await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].status, OrderStatus::Ready);
        assert_eq!(ready[0].items[0].name, "Паста");

        let none = handler.list(&OrderFilter::from_token(Some("nonexistent"))).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_revenue_total() {
        let handler = handler();
        assert_eq!(handler.revenue_total().await.unwrap(), Decimal::ZERO);

        handler.create(create(1, "пицца 500", OrderStatus::Paid)).await.unwrap();
        handler.create(create(2, "салат 300", OrderStatus::Paid)).await.unwrap();
        handler.create(create(3, "бургер 200", OrderStatus::Pending)).await.unwrap();

        assert_eq!(handler.revenue_total().await.unwrap(), Decimal::from(800));
    }

    #[tokio::test]
    async fn test_revenue_is_zero_without_paid_orders() {
        let handler = handler();
        handler.create(create(1, "кофе 100", OrderStatus::Pending)).await.unwrap();
        handler.create(create(2, "чай 50", OrderStatus::Pending)).await.unwrap();

        assert_eq!(handler.revenue_total().await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_in_memory_store_is_healthy() {
        let health = handler().check_health().await;

        assert!(health.status.is_healthy());
        assert_eq!(health.name, "store:in_memory");
    }
}
