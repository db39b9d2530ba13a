use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::domain::order::{OrderAggregate, OrderStatus, SizeType};
use super::errors::PreparationError;

// ============================================================================
// Preparation Aggregator
// ============================================================================
//
// Collapses line items of every qualifying order for one delivery date into
// per-(dish, size) quantities for the kitchen.
//
// Output order: dishes in the order they are first seen, sizes within a dish
// as plate, half tray, full tray. Quantities do not depend on input order.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparationSummaryItem {
    pub item_name: String,
    pub size_type: SizeType,
    pub total_quantity: u64,
}

pub type StatusFilter = HashSet<OrderStatus>;

/// Aggregate quantities for `delivery_date`. With no status filter every order
/// for that date is included.
pub fn aggregate<'a, I>(
    orders: I,
    delivery_date: NaiveDate,
    status_filter: Option<&StatusFilter>,
) -> Vec<PreparationSummaryItem>
where
    I: IntoIterator<Item = &'a OrderAggregate>,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut dishes: Vec<(&str, BTreeMap<SizeType, u64>)> = Vec::new();
    let mut order_count = 0usize;

    let qualifying = orders.into_iter().filter(|order| {
        order.delivery_date == delivery_date
            && status_filter.is_none_or(|statuses| statuses.contains(&order.status))
    });

    for order in qualifying {
        order_count += 1;
        for item in &order.items {
            let idx = *positions.entry(item.item_name.as_str()).or_insert_with(|| {
                dishes.push((item.item_name.as_str(), BTreeMap::new()));
                dishes.len() - 1
            });
            *dishes[idx].1.entry(item.size_type).or_insert(0) += u64::from(item.quantity);
        }
    }

    let summary: Vec<PreparationSummaryItem> = dishes
        .into_iter()
        .flat_map(|(name, sizes)| {
            sizes.into_iter().map(move |(size_type, total_quantity)| PreparationSummaryItem {
                item_name: name.to_string(),
                size_type,
                total_quantity,
            })
        })
        .collect();

    tracing::debug!(
        delivery_date = %delivery_date,
        orders = order_count,
        entries = summary.len(),
        "Aggregated preparation manifest"
    );

    summary
}

/// Calendar date of a timestamp, in the timestamp's own offset
pub fn delivery_day<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> NaiveDate {
    timestamp.date_naive()
}

/// Accept `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS`.
/// Any time-of-day component is dropped.
pub fn parse_delivery_date(input: &str) -> Result<NaiveDate, PreparationError> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(delivery_day(&timestamp));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.date());
    }

    Err(PreparationError::InvalidDeliveryDate(input.to_string()))
}

/// Parse a comma-separated status list such as `received,paid`.
/// An empty string means no filter.
pub fn parse_status_filter(input: &str) -> Result<Option<StatusFilter>, PreparationError> {
    let statuses = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<OrderStatus>().map_err(PreparationError::InvalidStatusFilter))
        .collect::<Result<StatusFilter, _>>()?;

    Ok(if statuses.is_empty() { None } else { Some(statuses) })
}
