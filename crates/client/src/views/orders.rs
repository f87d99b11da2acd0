//! Order list with status filtering.

use std::fmt;
use std::str::FromStr;

use artisan_bazaar_core::{Order, OrderStatus};

use super::{ListState, StatusBadge, load_list};
use crate::api::keys;
use crate::state::AppState;

/// Status filter of the order list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// Filter menu entries: `All`, then every known status.
    #[must_use]
    pub fn options() -> Vec<Self> {
        std::iter::once(Self::All)
            .chain(OrderStatus::known().into_iter().map(Self::Only))
            .collect()
    }

    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => order.status == *status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(OrderStatus::parse(s))
        })
    }
}

/// Orders whose status matches `filter`, in their original order.
#[must_use]
pub fn filter_orders(orders: &[Order], filter: &StatusFilter) -> Vec<Order> {
    orders
        .iter()
        .filter(|order| filter.matches(order))
        .cloned()
        .collect()
}

/// Badge for an order status. Unknown statuses get the neutral treatment.
#[must_use]
pub fn badge(status: &OrderStatus) -> StatusBadge {
    StatusBadge::new(status.as_str(), status.treatment())
}

/// Load the signed-in user's orders, filtered.
pub async fn load(state: &AppState, filter: &StatusFilter) -> ListState<Order> {
    let api = state.api().clone();
    load_list(state, keys::ORDERS, move || async move { api.orders().await })
        .await
        .filter(|order| filter.matches(order))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use artisan_bazaar_core::{OrderId, Price, StatusTreatment};
    use chrono::Utc;

    use super::*;

    fn order(id: i64, status: &str) -> Order {
        Order {
            id: OrderId::new(id).unwrap(),
            status: OrderStatus::parse(status),
            total: Price::from_cents(1000),
            created_at: Utc::now(),
            items: Vec::new(),
        }
    }

    #[test]
    fn test_filter_by_shipped_returns_exact_subset() {
        let orders = [order(1, "pending"), order(2, "shipped"), order(3, "delivered"), order(4, "shipped")];
        let shipped = filter_orders(&orders, &"shipped".parse().unwrap());
        let ids: Vec<i64> = shipped.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_all_keeps_everything() {
        let orders = [order(1, "pending"), order(2, "on_hold")];
        assert_eq!(filter_orders(&orders, &StatusFilter::All).len(), 2);
    }

    #[test]
    fn test_filter_with_no_match_is_empty_state() {
        let state = ListState::from_items(vec![order(1, "pending")]);
        let filter = StatusFilter::Only(OrderStatus::Cancelled);
        assert_eq!(state.filter(|o| filter.matches(o)), ListState::Empty);
    }

    #[test]
    fn test_options_start_with_all() {
        let options = StatusFilter::options();
        assert_eq!(options.first(), Some(&StatusFilter::All));
        assert_eq!(options.len(), 6);
        assert_eq!(options.last().unwrap().to_string(), "cancelled");
    }

    #[test]
    fn test_badges() {
        assert_eq!(
            badge(&OrderStatus::Shipped),
            StatusBadge {
                label: "Shipped".to_string(),
                treatment: StatusTreatment::Progress,
            }
        );
        let unknown = badge(&OrderStatus::parse("on_hold"));
        assert_eq!(unknown.label, "On hold");
        assert_eq!(unknown.treatment, StatusTreatment::Neutral);
    }
}
