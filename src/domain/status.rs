//! Fulfilment status shared by orders and their line items.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Items still moving through fulfilment.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing | Self::Shipped)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Derives the order-level status from its line items.
///
/// Rules are evaluated top to bottom and the first match wins:
///
/// 1. every item delivered: `Delivered`
/// 2. every item cancelled: `Cancelled`
/// 3. any item pending: `Pending`
/// 4. any item processing: `Processing`
/// 5. any item shipped: `Shipped`
/// 6. only delivered and cancelled items remain: `Delivered`
///
/// A single pending item therefore holds the whole order at `Pending`.
/// An empty item set reads as `Pending`.
pub fn aggregate_status<I>(items: I) -> OrderStatus
where
    I: IntoIterator<Item = OrderStatus>,
{
    let statuses: Vec<OrderStatus> = items.into_iter().collect();
    if statuses.is_empty() {
        return OrderStatus::Pending;
    }
    let all = |s: OrderStatus| statuses.iter().all(|x| *x == s);
    let any = |s: OrderStatus| statuses.contains(&s);

    if all(OrderStatus::Delivered) {
        OrderStatus::Delivered
    } else if all(OrderStatus::Cancelled) {
        OrderStatus::Cancelled
    } else if any(OrderStatus::Pending) {
        OrderStatus::Pending
    } else if any(OrderStatus::Processing) {
        OrderStatus::Processing
    } else if any(OrderStatus::Shipped) {
        OrderStatus::Shipped
    } else {
        OrderStatus::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use OrderStatus::*;

    #[test]
    fn uniform_extremes() {
        assert_eq!(aggregate_status([Delivered, Delivered]), Delivered);
        assert_eq!(aggregate_status([Cancelled, Cancelled]), Cancelled);
    }

    #[test]
    fn slowest_item_wins() {
        assert_eq!(aggregate_status([Delivered, Pending]), Pending);
        assert_eq!(aggregate_status([Shipped, Processing, Delivered]), Processing);
        assert_eq!(aggregate_status([Shipped, Delivered, Cancelled]), Shipped);
    }

    #[test]
    fn delivered_and_cancelled_mix_reads_delivered() {
        assert_eq!(aggregate_status([Delivered, Cancelled]), Delivered);
    }

    #[test]
    fn empty_is_pending() {
        assert_eq!(aggregate_status(Vec::new()), Pending);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("shipped".parse::<OrderStatus>(), Ok(Shipped));
        assert!("lost".parse::<OrderStatus>().is_err());
        assert_eq!(serde_json::to_string(&Cancelled).unwrap(), "\"cancelled\"");
    }

    fn status() -> impl Strategy<Value = OrderStatus> {
        prop::sample::select(OrderStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn any_pending_forces_pending(mut items in prop::collection::vec(status(), 0..8), at in 0usize..8) {
            let at = at.min(items.len());
            items.insert(at, Pending);
            prop_assert_eq!(aggregate_status(items), Pending);
        }

        #[test]
        fn order_independent(items in prop::collection::vec(status(), 1..8)) {
            let mut reversed = items.clone();
            reversed.reverse();
            prop_assert_eq!(aggregate_status(items), aggregate_status(reversed));
        }

        #[test]
        fn never_cancelled_unless_all_cancelled(items in prop::collection::vec(status(), 1..8)) {
            let result = aggregate_status(items.clone());
            if result == Cancelled {
                prop_assert!(items.iter().all(|s| *s == Cancelled));
            }
        }
    }
}
