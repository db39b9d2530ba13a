use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money;
use crate::domain::order::OrderAggregate;
use super::record::Customer;

// ============================================================================
// Customer Metrics View
// ============================================================================
//
// Read-side summaries over a customer's orders. Order totals are taken from
// the priced orders as stored, so a customer's spend always agrees with the
// totals shown on their individual orders.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub total_orders: u64,
    pub total_spent: Decimal,
    pub average_order_value: Decimal,
}

/// Summarize raw order totals; a missing total counts as zero
pub fn summarize_totals<I>(totals: I) -> CustomerSummary
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    let (total_orders, total_spent) = totals
        .into_iter()
        .fold((0u64, Decimal::ZERO), |(count, spent), total| {
            (count + 1, money::add(spent, total.unwrap_or(Decimal::ZERO)))
        });

    let average_order_value = if total_orders > 0 {
        money::round2(total_spent / Decimal::from(total_orders))
    } else {
        Decimal::ZERO
    };

    CustomerSummary {
        total_orders,
        total_spent,
        average_order_value,
    }
}

pub fn summarize<'a, I>(orders: I) -> CustomerSummary
where
    I: IntoIterator<Item = &'a OrderAggregate>,
{
    summarize_totals(orders.into_iter().map(|order| Some(order.total_amount)))
}

// ============================================================================
// Customer list filtering & sorting
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerListEntry {
    #[serde(flatten)]
    pub customer: Customer,
    pub order_count: u64,
    pub total_order_value: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSortField {
    Name,
    #[default]
    CreatedAt,
    TotalOrderValue,
    OrderCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerFilter {
    pub search_term: Option<String>,
    pub min_order_value: Option<Decimal>,
    pub min_order_count: Option<u64>,
    pub sort_by: CustomerSortField,
    pub sort_order: SortOrder,
}

/// Attach order statistics to each customer. Orders without a customer link
/// are ignored.
pub fn build_customer_entries(
    customers: Vec<Customer>,
    orders: &[OrderAggregate],
) -> Vec<CustomerListEntry> {
    let mut by_customer: HashMap<Uuid, Vec<&OrderAggregate>> = HashMap::new();
    for order in orders {
        if let Some(customer_id) = order.customer.customer_id {
            by_customer.entry(customer_id).or_default().push(order);
        }
    }

    customers
        .into_iter()
        .map(|customer| {
            let summary = by_customer
                .get(&customer.id)
                .map(|orders| summarize(orders.iter().copied()))
                .unwrap_or_default();
            CustomerListEntry {
                customer,
                order_count: summary.total_orders,
                total_order_value: summary.total_spent,
            }
        })
        .collect()
}

fn matches_search(entry: &CustomerListEntry, term: &str) -> bool {
    let customer = &entry.customer;
    customer.name.to_lowercase().contains(term)
        || customer.phone.as_str().to_lowercase().contains(term)
        || customer
            .email
            .as_ref()
            .is_some_and(|email| email.as_str().to_lowercase().contains(term))
}

fn compare(a: &CustomerListEntry, b: &CustomerListEntry, field: CustomerSortField) -> Ordering {
    match field {
        CustomerSortField::Name => {
            a.customer.name.to_lowercase().cmp(&b.customer.name.to_lowercase())
        }
        CustomerSortField::CreatedAt => a.customer.created_at.cmp(&b.customer.created_at),
        CustomerSortField::TotalOrderValue => a.total_order_value.cmp(&b.total_order_value),
        CustomerSortField::OrderCount => a.order_count.cmp(&b.order_count),
    }
}

pub fn filter_and_sort(
    entries: Vec<CustomerListEntry>,
    filter: &CustomerFilter,
) -> Vec<CustomerListEntry> {
    let term = filter
        .search_term
        .as_deref()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());

    let mut result: Vec<CustomerListEntry> = entries
        .into_iter()
        .filter(|entry| term.as_deref().is_none_or(|t| matches_search(entry, t)))
        .filter(|entry| filter.min_order_value.is_none_or(|min| entry.total_order_value >= min))
        .filter(|entry| filter.min_order_count.is_none_or(|min| entry.order_count >= min))
        .collect();

    // sort_by is stable, ties keep their input order in both directions
    result.sort_by(|a, b| match filter.sort_order {
        SortOrder::Asc => compare(a, b, filter.sort_by),
        SortOrder::Desc => compare(b, a, filter.sort_by),
    });

    result
}
