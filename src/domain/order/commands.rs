use chrono::NaiveDate;
use uuid::Uuid;

use super::value_objects::{CustomerSnapshot, DiscountPolicy, OrderItem, OrderStatus};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    CreateOrder {
        order_id: Uuid,
        order_number: String,
        customer: CustomerSnapshot,
        delivery_date: NaiveDate,
        delivery_time: Option<String>,
        items: Vec<OrderItem>,
        discount: DiscountPolicy,
    },
    UpdateItems {
        items: Vec<OrderItem>,
    },
    ChangeDiscount {
        discount: DiscountPolicy,
    },
    ChangeStatus {
        status: OrderStatus,
    },
}

impl OrderCommand {
    /// Short name used for logging and metric labels
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::CreateOrder { .. } => "CreateOrder",
            OrderCommand::UpdateItems { .. } => "UpdateItems",
            OrderCommand::ChangeDiscount { .. } => "ChangeDiscount",
            OrderCommand::ChangeStatus { .. } => "ChangeStatus",
        }
    }
}
