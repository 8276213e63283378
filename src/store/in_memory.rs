use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{OrderFilter, OrderStore, StoreError};
use crate::domain::order::{NewOrder, Order, OrderId};

/// Process-local order store.
///
/// Ids start at 1 and are never reused, like a database sequence.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<State>>,
}

#[derive(Default)]
struct State {
    last_id: OrderId,
    orders: HashMap<OrderId, Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut state = self.write()?;

        state.last_id += 1;
        let order = order.into_order(state.last_id);
        state.orders.insert(order.id, order.clone());

        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    async fn update(&self, order: &Order) -> Result<bool, StoreError> {
        let mut state = self.write()?;

        match state.orders.get_mut(&order.id) {
            Some(stored) => {
                // created_at stays as first stored
                stored.table_number = order.table_number;
                stored.items = order.items.clone();
                stored.total_price = order.total_price;
                stored.status = order.status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: OrderId) -> Result<bool, StoreError> {
        Ok(self.write()?.orders.remove(&id).is_some())
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let state = self.read()?;

        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(orders)
    }

    async fn revenue_total(&self) -> Result<Decimal, StoreError> {
        self.read()?
            .orders
            .values()
            .filter(|order| order.status.is_paid())
            .try_fold(Decimal::ZERO, |total, order| total.checked_add(order.total_price))
            .ok_or(StoreError::RevenueOverflow)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{CreateOrder, LineItem, OrderStatus};
    use chrono::{Duration, Utc};

    fn new_order(table_number: i32, price: i64, status: OrderStatus, age_secs: i64) -> NewOrder {
        NewOrder::from_command(
            CreateOrder {
                table_number,
                items: vec![LineItem::new("блюдо", Decimal::from(price))],
                status,
            },
            Utc::now() - Duration::seconds(age_secs),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryOrderStore::new();

        let first = store.insert(new_order(1, 100, OrderStatus::Pending, 0)).await.unwrap();
        let second = store.insert(new_order(2, 100, OrderStatus::Pending, 0)).await.unwrap();
        store.delete(second.id).await.unwrap();
        let third = store.insert(new_order(3, 100, OrderStatus::Pending, 0)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_items() {
        let store = InMemoryOrderStore::new();
        let draft = NewOrder::from_command(
            CreateOrder {
                table_number: 5,
                items: vec![
                    LineItem::new("суп", Decimal::new(1250, 2)),
                    LineItem::new("хлеб", Decimal::new(5, 1)),
                ],
                status: OrderStatus::Ready,
            },
            Utc::now(),
        )
        .unwrap();

        let stored = store.insert(draft).await.unwrap();
        let loaded = store.get(stored.id).await.unwrap().unwrap();

        assert_eq!(loaded.items, stored.items);
        assert_eq!(loaded.total_price, Decimal::from(13));
        assert_eq!(loaded.created_at, stored.created_at);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = InMemoryOrderStore::new();
        let old = store.insert(new_order(1, 10, OrderStatus::Pending, 60)).await.unwrap();
        let new = store.insert(new_order(2, 10, OrderStatus::Pending, 0)).await.unwrap();
        let middle = store.insert(new_order(3, 10, OrderStatus::Pending, 30)).await.unwrap();

        let ids: Vec<_> = store
            .list(&OrderFilter::All)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();

        assert_eq!(ids, vec![new.id, middle.id, old.id]);
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_ids() {
        let store = InMemoryOrderStore::new();
        let mut order = store.insert(new_order(1, 10, OrderStatus::Pending, 0)).await.unwrap();

        order.status = OrderStatus::Paid;
        assert!(store.update(&order).await.unwrap());
        assert_eq!(store.get(order.id).await.unwrap().unwrap().status, OrderStatus::Paid);

        order.id = 999;
        assert!(!store.update(&order).await.unwrap());
        assert!(!store.delete(999).await.unwrap());
    }

    #[tokio::test]
    async fn test_revenue_counts_only_paid() {
        let store = InMemoryOrderStore::new();
        assert_eq!(store.revenue_total().await.unwrap(), Decimal::ZERO);

        store.insert(new_order(1, 500, OrderStatus::Paid, 0)).await.unwrap();
        store.insert(new_order(2, 300, OrderStatus::Paid, 0)).await.unwrap();
        store.insert(new_order(3, 200, OrderStatus::Pending, 0)).await.unwrap();

        assert_eq!(store.revenue_total().await.unwrap(), Decimal::from(800));
    }

    #[tokio::test]
    async fn test_revenue_overflow_is_an_error() {
        let store = InMemoryOrderStore::new();
        for _ in 0..2 {
            let mut order = new_order(1, 10, OrderStatus::Paid, 0);
            order.total_price = Decimal::MAX;
            store.insert(order).await.unwrap();
        }

        assert!(matches!(store.revenue_total().await, Err(StoreError::RevenueOverflow)));
    }
}
