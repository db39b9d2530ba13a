use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::customer::Customer;
use crate::domain::order::OrderAggregate;
use super::{CustomerStore, OrderStore, StoreError};

/// In-memory record store for development and tests.
///
/// Orders are returned sorted by creation time so callers get a stable order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    orders: Arc<RwLock<HashMap<Uuid, OrderAggregate>>>,
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn select_orders<F>(&self, predicate: F) -> Result<Vec<OrderAggregate>, StoreError>
    where
        F: Fn(&OrderAggregate) -> bool,
    {
        let orders = self
            .orders
            .read()
            .map_err(|e| StoreError::Retrieval(format!("Failed to acquire read lock: {}", e)))?;

        let mut selected: Vec<OrderAggregate> =
            orders.values().filter(|o| predicate(o)).cloned().collect();
        selected.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.order_number.cmp(&b.order_number))
        });
        Ok(selected)
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn get_order(&self, id: Uuid) -> Result<Option<OrderAggregate>, StoreError> {
        let orders = self
            .orders
            .read()
            .map_err(|e| StoreError::Retrieval(format!("Failed to acquire read lock: {}", e)))?;

        Ok(orders.get(&id).cloned())
    }

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderAggregate>, StoreError> {
        Ok(self
            .select_orders(|o| o.order_number == order_number)?
            .into_iter()
            .next())
    }

    async fn save_order(&self, order: OrderAggregate) -> Result<(), StoreError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| StoreError::Retrieval(format!("Failed to acquire write lock: {}", e)))?;

        let taken = orders
            .values()
            .any(|existing| existing.order_number == order.order_number && existing.id != order.id);
        if taken {
            return Err(StoreError::DuplicateOrderNumber(order.order_number));
        }

        orders.insert(order.id, order);
        Ok(())
    }

    async fn orders_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<OrderAggregate>, StoreError> {
        self.select_orders(|o| o.customer.customer_id == Some(customer_id))
    }

    async fn orders_for_delivery_date(
        &self,
        delivery_date: NaiveDate,
    ) -> Result<Vec<OrderAggregate>, StoreError> {
        self.select_orders(|o| o.delivery_date == delivery_date)
    }

    async fn list_orders(&self) -> Result<Vec<OrderAggregate>, StoreError> {
        self.select_orders(|_| true)
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>, StoreError> {
        let customers = self
            .customers
            .read()
            .map_err(|e| StoreError::Retrieval(format!("Failed to acquire read lock: {}", e)))?;

        Ok(customers.get(&id).cloned())
    }

    async fn save_customer(&self, customer: Customer) -> Result<(), StoreError> {
        let mut customers = self
            .customers
            .write()
            .map_err(|e| StoreError::Retrieval(format!("Failed to acquire write lock: {}", e)))?;

        let phone = customer.phone.normalized();
        let taken = customers
            .values()
            .any(|existing| existing.id != customer.id && existing.phone.normalized() == phone);
        if taken {
            return Err(StoreError::DuplicatePhone(customer.phone.as_str().to_string()));
        }

        customers.insert(customer.id, customer);
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let customers = self
            .customers
            .read()
            .map_err(|e| StoreError::Retrieval(format!("Failed to acquire read lock: {}", e)))?;

        let mut all: Vec<Customer> = customers.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregate;
    use crate::domain::customer::NewCustomer;
    use crate::domain::order::{CustomerSnapshot, DiscountPolicy, OrderCommand, OrderItem, SizeType};
    use rust_decimal_macros::dec;

    fn order(number: &str, customer_id: Option<Uuid>, day: u32) -> OrderAggregate {
        let command = OrderCommand::CreateOrder {
            order_id: Uuid::new_v4(),
            order_number: number.to_string(),
            customer: CustomerSnapshot {
                customer_id,
                name: "Asha Patel".to_string(),
                phone: None,
            },
            delivery_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            delivery_time: None,
            items: vec![OrderItem::new("Dal Fry", SizeType::Plate, 1, dec!(10.00))],
            discount: DiscountPolicy::none(),
        };
        let events = OrderAggregate::handle_create(&command).unwrap();
        OrderAggregate::apply_first_event(&events[0]).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_get_order() {
        let store = InMemoryStore::new();
        let o = order("ORD-1", None, 1);
        let id = o.id;

        store.save_order(o).await.unwrap();

        let loaded = store.get_order(id).await.unwrap().unwrap();
        assert_eq!(loaded.order_number, "ORD-1");
        assert!(store.find_by_order_number("ORD-1").await.unwrap().is_some());
        assert!(store.get_order(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_order_number_rejected() {
        let store = InMemoryStore::new();
        let first = order("ORD-1", None, 1);
        store.save_order(first.clone()).await.unwrap();

        // Re-saving the same order is an update
        store.save_order(first).await.unwrap();

        let result = store.save_order(order("ORD-1", None, 2)).await;
        assert!(matches!(result.unwrap_err(), StoreError::DuplicateOrderNumber(n) if n == "ORD-1"));
    }

    #[tokio::test]
    async fn test_filter_by_customer_and_date() {
        let store = InMemoryStore::new();
        let customer_id = Uuid::new_v4();
        store.save_order(order("ORD-1", Some(customer_id), 1)).await.unwrap();
        store.save_order(order("ORD-2", Some(customer_id), 2)).await.unwrap();
        store.save_order(order("ORD-3", None, 1)).await.unwrap();

        assert_eq!(store.orders_for_customer(customer_id).await.unwrap().len(), 2);

        let may_first = store
            .orders_for_delivery_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .await
            .unwrap();
        let numbers: Vec<_> = may_first.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["ORD-1", "ORD-3"]);

        assert_eq!(store.list_orders().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_customers() {
        let store = InMemoryStore::new();
        let customer = Customer::register(NewCustomer {
            name: "Asha Patel".to_string(),
            phone: "555-0101".to_string(),
            ..Default::default()
        })
        .unwrap();
        let id = customer.id;

        store.save_customer(customer).await.unwrap();

        assert_eq!(store.get_customer(id).await.unwrap().unwrap().name, "Asha Patel");
        assert_eq!(store.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let store = InMemoryStore::new();
        let register = |name: &str, phone: &str| {
            Customer::register(NewCustomer {
                name: name.to_string(),
                phone: phone.to_string(),
                ..Default::default()
            })
            .unwrap()
        };

        let asha = register("Asha Patel", "(555) 010-1234");
        store.save_customer(asha.clone()).await.unwrap();

        // Re-saving the same customer is an update
        store.save_customer(asha).await.unwrap();

        let result = store.save_customer(register("Ravi Kumar", "555.010.1234")).await;
        assert!(matches!(
            result.unwrap_err(),
            StoreError::DuplicatePhone(p) if p == "555.010.1234"
        ));
        assert_eq!(store.list_customers().await.unwrap().len(), 1);

        store.save_customer(register("Ravi Kumar", "555-010-9999")).await.unwrap();
        assert_eq!(store.list_customers().await.unwrap().len(), 2);
    }
}
