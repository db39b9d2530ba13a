use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Status Lifecycle
// ============================================================================
//
// Intended flow:
//
//     received ──► delivered ──► paid
//         └──────────────────────▲
//
// Anything else (paid → received, delivered → received, ...) is a backward
// move. Whether a backward move is accepted depends on the TransitionPolicy.
// Status never touches pricing fields.
//
// ============================================================================

fn rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Received => 0,
        OrderStatus::Delivered => 1,
        OrderStatus::Paid => 2,
    }
}

/// True for the transitions that are part of the normal business flow
pub fn is_forward_transition(from: OrderStatus, to: OrderStatus) -> bool {
    rank(to) > rank(from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Accept every transition; backward ones are only reported
    #[default]
    Permissive,
    /// Reject backward transitions
    Strict,
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(format!("unknown transition policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    /// Same status, nothing to record
    Unchanged,
    Forward,
    /// Accepted under the permissive policy, but outside the normal flow
    Backward,
}

pub fn check_transition(
    from: OrderStatus,
    to: OrderStatus,
    policy: TransitionPolicy,
) -> Result<TransitionCheck, OrderError> {
    if from == to {
        return Ok(TransitionCheck::Unchanged);
    }
    if is_forward_transition(from, to) {
        return Ok(TransitionCheck::Forward);
    }

    match policy {
        TransitionPolicy::Permissive => Ok(TransitionCheck::Backward),
        TransitionPolicy::Strict => Err(OrderError::BackwardTransition { from, to }),
    }
}
