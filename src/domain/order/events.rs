use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::DomainEvent;
use super::pricing::OrderTotals;
use super::value_objects::{CustomerSnapshot, DiscountPolicy, OrderItem, OrderStatus};

// ============================================================================
// Order Events
// ============================================================================
//
// Every event that touches items or discount carries the totals computed at
// the same moment, so the three money fields are always persisted together
// with the inputs that produced them.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Created(OrderCreated),
    ItemsUpdated(OrderItemsUpdated),
    DiscountChanged(OrderDiscountChanged),
    StatusChanged(OrderStatusChanged),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => "OrderCreated",
            OrderEvent::ItemsUpdated(_) => "OrderItemsUpdated",
            OrderEvent::DiscountChanged(_) => "OrderDiscountChanged",
            OrderEvent::StatusChanged(_) => "OrderStatusChanged",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub order_number: String,
    pub customer: CustomerSnapshot,
    pub delivery_date: NaiveDate,
    pub delivery_time: Option<String>,
    pub items: Vec<OrderItem>,
    pub discount: DiscountPolicy,
    pub totals: OrderTotals,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderItemsUpdated {
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderDiscountChanged {
    pub discount: DiscountPolicy,
    pub totals: OrderTotals,
}

/// Status moved; `forward` is false for moves outside the normal flow
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderStatusChanged {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub forward: bool,
}
