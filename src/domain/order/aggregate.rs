use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::Aggregate;
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::events::*;
use super::lifecycle::{check_transition, TransitionCheck, TransitionPolicy};
use super::pricing::{OrderPricingCalculator, OrderTotals, PricingInput};
use super::value_objects::{CustomerSnapshot, DiscountPolicy, OrderItem, OrderStatus};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAggregate {
    // Identity
    pub id: Uuid,
    pub version: i64,
    pub order_number: String,

    pub customer: CustomerSnapshot,
    pub delivery_date: NaiveDate,
    pub delivery_time: Option<String>,
    pub status: OrderStatus,

    pub items: Vec<OrderItem>,
    pub discount: DiscountPolicy,

    // Derived money fields, always written together with items/discount
    pub subtotal_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip)]
    pub transition_policy: TransitionPolicy,
}

impl OrderAggregate {
    /// Validate a `CreateOrder` command and produce the creation event.
    /// Every other command goes through `handle_command` on an existing order.
    pub fn handle_create(command: &OrderCommand) -> Result<Vec<OrderEvent>, OrderError> {
        let OrderCommand::CreateOrder {
            order_id,
            order_number,
            customer,
            delivery_date,
            delivery_time,
            items,
            discount,
        } = command
        else {
            return Err(OrderError::NotInitialized);
        };

        if order_number.trim().is_empty() {
            return Err(OrderError::EmptyOrderNumber);
        }
        if customer.name.trim().is_empty() {
            return Err(OrderError::EmptyCustomerName);
        }
        let items = validate_items(items)?;
        let totals = OrderPricingCalculator::compute(&PricingInput {
            items: &items,
            discount,
        });

        Ok(vec![OrderEvent::Created(OrderCreated {
            order_id: *order_id,
            order_number: order_number.trim().to_string(),
            customer: customer.clone(),
            delivery_date: *delivery_date,
            delivery_time: delivery_time.clone().filter(|t| !t.trim().is_empty()),
            items,
            discount: discount.clone(),
            totals,
        })])
    }

    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    pub fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal_amount,
            discount_amount: self.discount_amount,
            total: self.total_amount,
        }
    }

    fn set_totals(&mut self, totals: &OrderTotals) {
        self.subtotal_amount = totals.subtotal;
        self.discount_amount = totals.discount_amount;
        self.total_amount = totals.total;
    }
}

/// Largest unit price accepted on a line item
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Largest quantity accepted on a line item
pub const MAX_QUANTITY: u32 = 9_999;

/// Check business rules on line items and re-derive each `total_price`
fn validate_items(items: &[OrderItem]) -> Result<Vec<OrderItem>, OrderError> {
    if items.is_empty() {
        return Err(OrderError::EmptyItems);
    }

    items
        .iter()
        .map(|item| {
            if item.item_name.trim().is_empty() {
                return Err(OrderError::EmptyItemName);
            }
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    item_name: item.item_name.clone(),
                    quantity: item.quantity,
                });
            }
            if item.quantity > MAX_QUANTITY {
                return Err(OrderError::QuantityTooLarge {
                    item_name: item.item_name.clone(),
                    quantity: item.quantity,
                    max: MAX_QUANTITY,
                });
            }
            if item.unit_price < Decimal::ZERO {
                return Err(OrderError::NegativeUnitPrice(item.item_name.clone()));
            }
            if item.unit_price > MAX_UNIT_PRICE {
                return Err(OrderError::UnitPriceTooLarge {
                    item_name: item.item_name.clone(),
                    unit_price: item.unit_price,
                    max: MAX_UNIT_PRICE,
                });
            }
            Ok(OrderItem::new(
                item.item_name.clone(),
                item.size_type,
                item.quantity,
                item.unit_price,
            ))
        })
        .collect()
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderAggregate {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Created(e) => {
                let now = Utc::now();
                let mut order = Self {
                    id: e.order_id,
                    version: 1,
                    order_number: e.order_number.clone(),
                    customer: e.customer.clone(),
                    delivery_date: e.delivery_date,
                    delivery_time: e.delivery_time.clone(),
                    status: OrderStatus::Received,
                    items: e.items.clone(),
                    discount: e.discount.clone(),
                    subtotal_amount: Decimal::ZERO,
                    discount_amount: Decimal::ZERO,
                    total_amount: Decimal::ZERO,
                    created_at: now,
                    updated_at: now,
                    transition_policy: TransitionPolicy::default(),
                };
                order.set_totals(&e.totals);
                Ok(order)
            }
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            OrderEvent::Created(_) => return Err(OrderError::AlreadyCreated),
            OrderEvent::ItemsUpdated(e) => {
                self.items = e.items.clone();
                self.set_totals(&e.totals);
            }
            OrderEvent::DiscountChanged(e) => {
                self.discount = e.discount.clone();
                self.set_totals(&e.totals);
            }
            OrderEvent::StatusChanged(e) => {
                self.status = e.to;
            }
        }

        self.version += 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::CreateOrder { .. } => Err(OrderError::AlreadyCreated),

            OrderCommand::UpdateItems { items } => {
                let items = validate_items(items)?;
                let totals = OrderPricingCalculator::compute(&PricingInput {
                    items: &items,
                    discount: &self.discount,
                });

                Ok(vec![OrderEvent::ItemsUpdated(OrderItemsUpdated { items, totals })])
            }

            OrderCommand::ChangeDiscount { discount } => {
                if &self.discount == discount {
                    return Ok(vec![]); // No change
                }
                let totals = OrderPricingCalculator::compute(&PricingInput {
                    items: &self.items,
                    discount,
                });

                Ok(vec![OrderEvent::DiscountChanged(OrderDiscountChanged {
                    discount: discount.clone(),
                    totals,
                })])
            }

            OrderCommand::ChangeStatus { status } => {
                let check = check_transition(self.status, *status, self.transition_policy)?;
                if check == TransitionCheck::Unchanged {
                    return Ok(vec![]);
                }

                Ok(vec![OrderEvent::StatusChanged(OrderStatusChanged {
                    from: self.status,
                    to: *status,
                    forward: check == TransitionCheck::Forward,
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::value_objects::SizeType;
    use rust_decimal_macros::dec;

    fn create_command(items: Vec<OrderItem>, discount: DiscountPolicy) -> OrderCommand {
        OrderCommand::CreateOrder {
            order_id: Uuid::new_v4(),
            order_number: "ORD-1001".to_string(),
            customer: CustomerSnapshot {
                customer_id: None,
                name: "Asha Patel".to_string(),
                phone: Some("555-0101".to_string()),
            },
            delivery_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            delivery_time: Some("6:30 PM".to_string()),
            items,
            discount,
        }
    }

    fn create_test_order() -> OrderAggregate {
        let command = create_command(
            vec![
                OrderItem::new("Dal Fry", SizeType::Plate, 3, dec!(10.00)),
                OrderItem::new("Veg Biryani", SizeType::HalfTray, 1, dec!(55.00)),
            ],
            DiscountPolicy::percentage(dec!(10)),
        );
        let events = OrderAggregate::handle_create(&command).unwrap();
        OrderAggregate::apply_first_event(&events[0]).unwrap()
    }

    #[test]
    fn test_order_creation_prices_order() {
        let order = create_test_order();

        assert_eq!(order.status, OrderStatus::Received);
        assert_eq!(order.version, 1);
        assert_eq!(order.subtotal_amount, dec!(85.00));
        assert_eq!(order.discount_amount, dec!(8.50));
        assert_eq!(order.total_amount, dec!(76.50));
    }

    #[test]
    fn test_create_with_empty_items_fails() {
        let result = OrderAggregate::handle_create(&create_command(vec![], DiscountPolicy::none()));
        assert!(matches!(result.unwrap_err(), OrderError::EmptyItems));
    }

    #[test]
    fn test_create_with_zero_quantity_fails() {
        let items = vec![OrderItem::new("Dal Fry", SizeType::Plate, 0, dec!(10.00))];
        let result = OrderAggregate::handle_create(&create_command(items, DiscountPolicy::none()));
        assert!(matches!(result.unwrap_err(), OrderError::InvalidQuantity { quantity: 0, .. }));
    }

    #[test]
    fn test_create_with_negative_price_fails() {
        let items = vec![OrderItem::new("Dal Fry", SizeType::Plate, 1, dec!(-1.00))];
        let result = OrderAggregate::handle_create(&create_command(items, DiscountPolicy::none()));
        assert!(matches!(result.unwrap_err(), OrderError::NegativeUnitPrice(_)));
    }

    #[test]
    fn test_create_with_blank_customer_name_fails() {
        let mut command = create_command(
            vec![OrderItem::new("Dal Fry", SizeType::Plate, 1, dec!(10.00))],
            DiscountPolicy::none(),
        );
        if let OrderCommand::CreateOrder { customer, .. } = &mut command {
            customer.name = "   ".to_string();
        }
        let result = OrderAggregate::handle_create(&command);
        assert!(matches!(result.unwrap_err(), OrderError::EmptyCustomerName));
    }

    #[test]
    fn test_create_rederives_stale_line_totals() {
        let mut stale = OrderItem::new("Dal Fry", SizeType::Plate, 3, dec!(10.00));
        stale.total_price = dec!(999.00);
        let command = create_command(vec![stale], DiscountPolicy::none());
        let events = OrderAggregate::handle_create(&command).unwrap();
        let order = OrderAggregate::apply_first_event(&events[0]).unwrap();

        assert_eq!(order.items[0].total_price, dec!(30.00));
        assert_eq!(order.subtotal_amount, dec!(30.00));
    }

    #[test]
    fn test_update_items_recomputes_totals() {
        let mut order = create_test_order();
        let command = OrderCommand::UpdateItems {
            items: vec![OrderItem::new("Dal Fry", SizeType::FullTray, 2, dec!(80.00))],
        };

        let events = order.handle_command(&command).unwrap();
        order.apply_event(&events[0]).unwrap();

        assert_eq!(order.version, 2);
        assert_eq!(order.subtotal_amount, dec!(160.00));
        assert_eq!(order.discount_amount, dec!(16.00));
        assert_eq!(order.total_amount, dec!(144.00));
    }

    #[test]
    fn test_change_discount_recomputes_totals() {
        let mut order = create_test_order();
        let command = OrderCommand::ChangeDiscount {
            discount: DiscountPolicy::fixed(dec!(500)),
        };

        let events = order.handle_command(&command).unwrap();
        order.apply_event(&events[0]).unwrap();

        assert_eq!(order.discount_amount, dec!(85.00));
        assert_eq!(order.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_same_discount_emits_nothing() {
        let order = create_test_order();
        let command = OrderCommand::ChangeDiscount {
            discount: order.discount.clone(),
        };

        assert!(order.handle_command(&command).unwrap().is_empty());
    }

    #[test]
    fn test_status_change_keeps_totals() {
        let mut order = create_test_order();
        let before = order.totals();

        for status in [OrderStatus::Delivered, OrderStatus::Paid] {
            let events = order.handle_command(&OrderCommand::ChangeStatus { status }).unwrap();
            order.apply_event(&events[0]).unwrap();
        }

        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.totals(), before);
    }

    #[test]
    fn test_backward_status_permissive_by_default() {
        let mut order = create_test_order();
        let events = order
            .handle_command(&OrderCommand::ChangeStatus { status: OrderStatus::Paid })
            .unwrap();
        order.apply_event(&events[0]).unwrap();

        let events = order
            .handle_command(&OrderCommand::ChangeStatus { status: OrderStatus::Received })
            .unwrap();
        match &events[0] {
            OrderEvent::StatusChanged(e) => assert!(!e.forward),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_backward_status_rejected_when_strict() {
        let mut order = create_test_order().with_transition_policy(TransitionPolicy::Strict);
        let events = order
            .handle_command(&OrderCommand::ChangeStatus { status: OrderStatus::Delivered })
            .unwrap();
        order.apply_event(&events[0]).unwrap();

        let result =
            order.handle_command(&OrderCommand::ChangeStatus { status: OrderStatus::Received });
        assert!(matches!(result.unwrap_err(), OrderError::BackwardTransition { .. }));
    }

    #[test]
    fn test_create_on_existing_order_fails() {
        let order = create_test_order();
        let result = order.handle_command(&create_command(vec![], DiscountPolicy::none()));
        assert!(matches!(result.unwrap_err(), OrderError::AlreadyCreated));
    }

    #[test]
    fn test_apply_first_event_non_created_fails() {
        let event = OrderEvent::StatusChanged(OrderStatusChanged {
            from: OrderStatus::Received,
            to: OrderStatus::Paid,
            forward: true,
        });
        let result = OrderAggregate::apply_first_event(&event);
        assert!(matches!(result.unwrap_err(), OrderError::NotInitialized));
    }

    #[test]
    fn test_replaying_events_rebuilds_state() {
        let command = create_command(
            vec![OrderItem::new("Dal Fry", SizeType::Plate, 3, dec!(10.00))],
            DiscountPolicy::none(),
        );
        let created = OrderAggregate::handle_create(&command).unwrap().remove(0);
        let mut order = OrderAggregate::apply_first_event(&created).unwrap();

        let discount = order
            .handle_command(&OrderCommand::ChangeDiscount {
                discount: DiscountPolicy::fixed(dec!(5)),
            })
            .unwrap()
            .remove(0);
        order.apply_event(&discount).unwrap();

        let mut replayed = OrderAggregate::apply_first_event(&created).unwrap();
        replayed.apply_event(&discount).unwrap();

        assert_eq!(replayed.aggregate_id(), order.aggregate_id());
        assert_eq!(replayed.version(), 2);
        assert_eq!(replayed.totals(), order.totals());
        assert_eq!(replayed.total_amount, dec!(25.00));
    }

    #[test]
    fn test_unit_price_above_maximum_is_rejected() {
        let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let items = vec![OrderItem::new("Dal Fry", SizeType::Plate, 2, huge)];

        let result = OrderAggregate::handle_create(&create_command(items, DiscountPolicy::none()));
        assert!(matches!(result.unwrap_err(), OrderError::UnitPriceTooLarge { .. }));

        let just_over = MAX_UNIT_PRICE + dec!(0.01);
        let items = vec![OrderItem::new("Dal Fry", SizeType::Plate, 1, just_over)];
        let result = OrderAggregate::handle_create(&create_command(items, DiscountPolicy::none()));
        assert!(matches!(result.unwrap_err(), OrderError::UnitPriceTooLarge { .. }));
    }

    #[test]
    fn test_quantity_above_maximum_is_rejected() {
        let items = vec![OrderItem::new("Dal Fry", SizeType::Plate, MAX_QUANTITY + 1, dec!(10.00))];
        let result = OrderAggregate::handle_create(&create_command(items, DiscountPolicy::none()));
        assert!(matches!(
            result.unwrap_err(),
            OrderError::QuantityTooLarge { quantity: 10_000, .. }
        ));

        let items = vec![OrderItem::new("Dal Fry", SizeType::Plate, u32::MAX, MAX_UNIT_PRICE)];
        let result = OrderAggregate::handle_create(&create_command(items, DiscountPolicy::none()));
        assert!(matches!(result.unwrap_err(), OrderError::QuantityTooLarge { .. }));
    }

    #[test]
    fn test_largest_accepted_order_prices_without_overflow() {
        let items = (0..50)
            .map(|i| {
                let name = format!("Dish {i}");
                OrderItem::new(name, SizeType::FullTray, MAX_QUANTITY, MAX_UNIT_PRICE)
            })
            .collect();
        let command = create_command(items, DiscountPolicy::percentage(dec!(100)));

        let events = OrderAggregate::handle_create(&command).unwrap();
        let order = OrderAggregate::apply_first_event(&events[0]).unwrap();

        assert_eq!(order.subtotal_amount, Decimal::from(499_950_000_000i64));
        assert_eq!(order.discount_amount, order.subtotal_amount);
        assert_eq!(order.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_update_items_above_maximum_is_rejected() {
        let order = create_test_order();
        let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let command = OrderCommand::UpdateItems {
            items: vec![OrderItem::new("Dal Fry", SizeType::Plate, 2, huge)],
        };

        let result = order.handle_command(&command);
        assert!(matches!(result.unwrap_err(), OrderError::UnitPriceTooLarge { .. }));
    }
}
