use std::sync::Arc;

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use crate::aggregate::{Aggregate, DomainEvent, EventEnvelope};
use crate::metrics::Metrics;
use crate::store::{OrderStore, StoreError};

use super::aggregate::OrderAggregate;
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::events::OrderEvent;
use super::lifecycle::TransitionPolicy;
use super::pricing::{review_discount, DiscountWarning};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Record Store
//
// The priced order (items, discount and the three money fields) is written
// in a single save, so stored totals always match stored items.
//
// ============================================================================

#[derive(Debug)]
pub struct HandledCommand {
    pub order: OrderAggregate,
    pub events: Vec<EventEnvelope<OrderEvent>>,
}

pub struct OrderCommandHandler {
    store: Arc<dyn OrderStore>,
    metrics: Arc<Metrics>,
    transition_policy: TransitionPolicy,
}

impl OrderCommandHandler {
    pub fn new(
        store: Arc<dyn OrderStore>,
        metrics: Arc<Metrics>,
        transition_policy: TransitionPolicy,
    ) -> Self {
        Self {
            store,
            metrics,
            transition_policy,
        }
    }

    /// Handle a command and persist the resulting order state
    pub async fn handle(
        &self,
        order_id: Uuid,
        command: OrderCommand,
        correlation_id: Uuid,
    ) -> Result<HandledCommand> {
        let command_name = command.name();
        let result = self.try_handle(order_id, &command, correlation_id).await;

        match &result {
            Ok(handled) => {
                self.metrics.record_command(command_name, true, None);
                tracing::info!(
                    order_id = %order_id,
                    command = command_name,
                    version = handled.order.version,
                    events = handled.events.len(),
                    total = %handled.order.total_amount,
                    "✅ Order command handled"
                );
            }
            Err(e) => {
                self.metrics.record_command(command_name, false, Some(failure_reason(e)));
                tracing::warn!(
                    order_id = %order_id,
                    command = command_name,
                    error = %e,
                    "Order command rejected"
                );
            }
        }

        result
    }

    async fn try_handle(
        &self,
        order_id: Uuid,
        command: &OrderCommand,
        correlation_id: Uuid,
    ) -> Result<HandledCommand> {
        let (order, domain_events, expected_version) = match command {
            OrderCommand::CreateOrder { order_id: command_order_id, .. } => {
                if *command_order_id != order_id {
                    bail!("CreateOrder id {} does not match target {}", command_order_id, order_id);
                }
                if self.store.get_order(order_id).await?.is_some() {
                    return Err(OrderError::AlreadyCreated.into());
                }

                let domain_events = OrderAggregate::handle_create(command)?;
                let Some((first, rest)) = domain_events.split_first() else {
                    bail!("CreateOrder produced no events");
                };
                let mut order = OrderAggregate::apply_first_event(first)?;
                for event in rest {
                    order.apply_event(event)?;
                }
                (order, domain_events, 0)
            }
            _ => {
                let mut order = self
                    .store
                    .get_order(order_id)
                    .await?
                    .ok_or(StoreError::OrderNotFound(order_id))?
                    .with_transition_policy(self.transition_policy);
                let expected_version = order.version();

                let domain_events = order.handle_command(command)?;
                for event in &domain_events {
                    order.apply_event(event)?;
                }
                (order, domain_events, expected_version)
            }
        };

        if domain_events.is_empty() {
            tracing::debug!(order_id = %order_id, "Command produced no change");
            return Ok(HandledCommand { order, events: vec![] });
        }

        self.observe_events(&order, &domain_events);

        self.store
            .save_order(order.clone())
            .await
            .with_context(|| format!("Failed to save order {}", order.order_number))?;

        let events = domain_events
            .into_iter()
            .zip(expected_version + 1..)
            .map(|(event, seq)| {
                EventEnvelope::new(order.aggregate_id(), seq, event, correlation_id)
                    .with_metadata("order_number", order.order_number.clone())
            })
            .collect();

        Ok(HandledCommand { order, events })
    }

    /// Log and count clamped discounts and out-of-flow status moves
    fn observe_events(&self, order: &OrderAggregate, events: &[OrderEvent]) {
        let repriced = events.iter().any(|e| !matches!(e, OrderEvent::StatusChanged(_)));
        if repriced {
            for warning in review_discount(&order.discount, order.subtotal_amount) {
                let discount_type =
                    order.discount.discount_type.map(|t| t.as_str()).unwrap_or("none");
                self.metrics.record_discount_clamp(discount_type);
                match warning {
                    DiscountWarning::NegativeValue { value } => {
                        tracing::warn!(
                            order_id = %order.id,
                            value = %value,
                            "Negative discount clamped to 0"
                        );
                    }
                    DiscountWarning::PercentageAboveHundred { value } => {
                        tracing::warn!(
                            order_id = %order.id,
                            value = %value,
                            "Percentage discount clamped to 100"
                        );
                    }
                    DiscountWarning::FixedExceedsSubtotal { value, subtotal } => {
                        tracing::warn!(
                            order_id = %order.id,
                            value = %value,
                            subtotal = %subtotal,
                            "Fixed discount capped at subtotal"
                        );
                    }
                }
            }
        }

        for event in events {
            if let OrderEvent::StatusChanged(e) = event {
                self.metrics.record_status_transition(e.from.as_str(), e.to.as_str(), e.forward);
                if !e.forward {
                    tracing::warn!(
                        order_id = %order.id,
                        from = %e.from,
                        to = %e.to,
                        "Order status moved backward"
                    );
                }
            }
            tracing::debug!(order_id = %order.id, event_type = event.event_type(), "Applied event");
        }
    }
}

fn failure_reason(error: &anyhow::Error) -> &'static str {
    if let Some(e) = error.downcast_ref::<OrderError>() {
        return match e {
            OrderError::BackwardTransition { .. } => "backward_transition",
            OrderError::AlreadyCreated => "already_created",
            _ => "validation",
        };
    }
    match error.downcast_ref::<StoreError>() {
        Some(StoreError::OrderNotFound(_)) => "not_found",
        Some(StoreError::DuplicateOrderNumber(_)) => "duplicate_order_number",
        Some(_) => "store",
        None => "unknown",
    }
}
