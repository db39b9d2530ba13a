// ============================================================================
// Record Store - persistence collaborator
// ============================================================================
//
// The pricing and aggregation code never talks to storage directly. Command
// handlers and the HTTP layer go through these traits, so any backend that
// can do key and filter lookups will do.
//
// Concurrent edits of the same order are last-writer-wins here; a production
// backend should compare `OrderAggregate::version` before writing.
//
// ============================================================================

mod in_memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::customer::Customer;
use crate::domain::order::OrderAggregate;

pub use in_memory::InMemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("Order number already in use: {0}")]
    DuplicateOrderNumber(String),

    #[error("Phone number already registered: {0}")]
    DuplicatePhone(String),

    #[error("Failed to read from record store: {0}")]
    Retrieval(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_order(&self, id: Uuid) -> Result<Option<OrderAggregate>, StoreError>;

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderAggregate>, StoreError>;

    /// Insert or replace. Fails if another order already uses the order number.
    async fn save_order(&self, order: OrderAggregate) -> Result<(), StoreError>;

    async fn orders_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<OrderAggregate>, StoreError>;

    async fn orders_for_delivery_date(
        &self,
        delivery_date: NaiveDate,
    ) -> Result<Vec<OrderAggregate>, StoreError>;

    async fn list_orders(&self) -> Result<Vec<OrderAggregate>, StoreError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>, StoreError>;

    /// Insert or replace. Fails if another customer already uses the phone number.
    async fn save_customer(&self, customer: Customer) -> Result<(), StoreError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;
}
