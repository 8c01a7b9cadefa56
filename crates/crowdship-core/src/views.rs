//! # Derived Views
//!
//! Role-filtered projections of the order collection. Nothing here is
//! stored: every view is recomputed from the full list on each read, so the
//! collection stays the single source of truth.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Order, OrderStatus, User, UserType};

/// Orders that belong to `caller`.
///
/// - sender: orders they created
/// - partner: orders assigned to them
/// - signed out: nothing
pub fn user_orders(orders: &[Order], caller: Option<&User>) -> Vec<Order> {
    let Some(user) = caller else {
        return Vec::new();
    };

    orders
        .iter()
        .filter(|order| match user.user_type {
            UserType::User => order.is_owned_by(&user.id),
            UserType::Partner => order.is_assigned_to(&user.id),
        })
        .cloned()
        .collect()
}

/// The open job pool: pending, unassigned orders. Partners only.
pub fn available_orders(orders: &[Order], caller: Option<&User>) -> Vec<Order> {
    match caller {
        Some(user) if user.is_partner() => orders
            .iter()
            .filter(|order| order.is_available())
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Dashboard statistics over a caller's orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total: usize,
    pub pending: usize,
    /// Accepted or in transit.
    pub active: usize,
    pub delivered: usize,
    pub cancelled: usize,
    /// Sum of delivered order amounts: earnings for a partner, spend for a
    /// sender.
    pub delivered_amount: Money,
}

impl OrderSummary {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders
            .into_iter()
            .fold(OrderSummary::default(), |mut summary, order| {
                summary.total += 1;
                match order.status {
                    OrderStatus::Pending => summary.pending += 1,
                    OrderStatus::Delivered => {
                        summary.delivered += 1;
                        summary.delivered_amount += order.amount;
                    }
                    OrderStatus::Cancelled => summary.cancelled += 1,
                    status if status.is_active() => summary.active += 1,
                    _ => {}
                }
                summary
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeliveryLocation, OrderDraft, PackageSize};
    use chrono::Utc;

    fn user(id: &str, user_type: UserType) -> User {
        User {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{}@example.com", id),
            user_type,
        }
    }

    fn order(id: &str, owner: &str, partner: Option<&str>, status: OrderStatus) -> Order {
        let draft = OrderDraft {
            pickup_location: DeliveryLocation::new("p", 0.0, 0.0, "A"),
            delivery_location: DeliveryLocation::new("d", 0.0, 1.0, "B"),
            package_size: PackageSize::Large,
            amount: Money::from_cents(1000),
        };
        let mut order = Order::from_draft(id.to_string(), owner, draft, Utc::now());
        order.partner_id = partner.map(str::to_string);
        order.status = status;
        order
    }

    fn fixture() -> Vec<Order> {
        vec![
            order("1", "u1", None, OrderStatus::Pending),
            order("2", "u1", Some("p1"), OrderStatus::Accepted),
            order("3", "u2", Some("p1"), OrderStatus::Delivered),
            order("4", "u2", None, OrderStatus::Pending),
            order("5", "u2", None, OrderStatus::Cancelled),
        ]
    }

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_user_orders_for_sender() {
        let orders = fixture();
        let u1 = user("u1", UserType::User);
        assert_eq!(ids(&user_orders(&orders, Some(&u1))), vec!["1", "2"]);
    }

    #[test]
    fn test_user_orders_for_partner() {
        let orders = fixture();
        let p1 = user("p1", UserType::Partner);
        assert_eq!(ids(&user_orders(&orders, Some(&p1))), vec!["2", "3"]);
    }

    #[test]
    fn test_user_orders_signed_out() {
        assert!(user_orders(&fixture(), None).is_empty());
    }

    #[test]
    fn test_available_orders_partner_only() {
        let orders = fixture();
        let p1 = user("p1", UserType::Partner);
        let u1 = user("u1", UserType::User);

        assert_eq!(ids(&available_orders(&orders, Some(&p1))), vec!["1", "4"]);
        assert!(available_orders(&orders, Some(&u1)).is_empty());
        assert!(available_orders(&orders, None).is_empty());
    }

    #[test]
    fn test_summary() {
        let orders = fixture();
        let summary = OrderSummary::from_orders(&orders);

        assert_eq!(summary.total, 5);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.delivered_amount, Money::from_cents(1000));
    }
}
