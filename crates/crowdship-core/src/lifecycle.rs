//! # Order Lifecycle
//!
//! The explicit state machine behind every order mutation.
//!
//! ## Transition Table
//! ```text
//! ┌──────────────────┬────────────────────────────┬───────────┬──────────────────────────┐
//! │ Action           │ From                       │ To        │ Who                      │
//! ├──────────────────┼────────────────────────────┼───────────┼──────────────────────────┤
//! │ accept           │ pending                    │ accepted  │ any partner (becomes     │
//! │                  │                            │           │ the order's partner)     │
//! │ start_transit    │ accepted                   │ in_transit│ assigned partner         │
//! │ deliver          │ in_transit                 │ delivered │ assigned partner         │
//! │ cancel           │ pending/accepted/in_transit│ cancelled │ owning user or assigned  │
//! │                  │                            │           │ partner                  │
//! └──────────────────┴────────────────────────────┴───────────┴──────────────────────────┘
//! ```
//!
//! Permission is checked before status: a caller with the wrong role gets
//! `Forbidden` even when the order is already terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, OrderStatus, User, UserType};

/// A requested change to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Accept,
    StartTransit,
    Deliver,
    Cancel,
}

impl OrderAction {
    pub const ALL: [OrderAction; 4] = [
        OrderAction::Accept,
        OrderAction::StartTransit,
        OrderAction::Deliver,
        OrderAction::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Accept => "accept",
            OrderAction::StartTransit => "start_transit",
            OrderAction::Deliver => "deliver",
            OrderAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may perform a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permitted {
    /// Any account with the partner role.
    AnyPartner,
    /// Only the partner the order is assigned to.
    AssignedPartner,
    /// The sender who owns the order, or its assigned partner.
    OwnerOrAssignedPartner,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    action: OrderAction,
    from: &'static [OrderStatus],
    to: OrderStatus,
    permitted: Permitted,
}

const TRANSITIONS: &[Transition] = &[
    Transition {
        action: OrderAction::Accept,
        from: &[OrderStatus::Pending],
        to: OrderStatus::Accepted,
        permitted: Permitted::AnyPartner,
    },
    Transition {
        action: OrderAction::StartTransit,
        from: &[OrderStatus::Accepted],
        to: OrderStatus::InTransit,
        permitted: Permitted::AssignedPartner,
    },
    Transition {
        action: OrderAction::Deliver,
        from: &[OrderStatus::InTransit],
        to: OrderStatus::Delivered,
        permitted: Permitted::AssignedPartner,
    },
    Transition {
        action: OrderAction::Cancel,
        from: &[
            OrderStatus::Pending,
            OrderStatus::Accepted,
            OrderStatus::InTransit,
        ],
        to: OrderStatus::Cancelled,
        permitted: Permitted::OwnerOrAssignedPartner,
    },
];

// Indexes into TRANSITIONS, which lists one entry per action in ALL order.
fn transition_for(action: OrderAction) -> &'static Transition {
    match action {
        OrderAction::Accept => &TRANSITIONS[0],
        OrderAction::StartTransit => &TRANSITIONS[1],
        OrderAction::Deliver => &TRANSITIONS[2],
        OrderAction::Cancel => &TRANSITIONS[3],
    }
}

const PARTNERS_ONLY: &str = "Only delivery partners can accept orders";
const ASSIGNED_PARTNER_ONLY: &str = "Only the assigned delivery partner can update this order";

fn check_permission(order: &Order, actor: &User, permitted: Permitted) -> CoreResult<()> {
    match (permitted, actor.user_type) {
        (Permitted::AnyPartner, UserType::Partner) => Ok(()),
        (Permitted::AnyPartner, UserType::User) => Err(CoreError::forbidden(PARTNERS_ONLY)),
        (Permitted::AssignedPartner, UserType::Partner) if order.is_assigned_to(&actor.id) => {
            Ok(())
        }
        (Permitted::AssignedPartner, _) => Err(CoreError::forbidden(ASSIGNED_PARTNER_ONLY)),
        (Permitted::OwnerOrAssignedPartner, UserType::User) => {
            if order.is_owned_by(&actor.id) {
                Ok(())
            } else {
                Err(CoreError::forbidden("You can only cancel your own orders"))
            }
        }
        (Permitted::OwnerOrAssignedPartner, UserType::Partner) => {
            if order.is_assigned_to(&actor.id) {
                Ok(())
            } else {
                Err(CoreError::forbidden(
                    "You can only cancel orders assigned to you",
                ))
            }
        }
    }
}

/// Rejects `actor` when their role alone rules out `action`, before any
/// order is looked up.
///
/// Gives the same error [`decide`] would for that role. Passing this check
/// does not mean the action is allowed on a particular order.
pub fn check_role(action: OrderAction, actor: &User) -> CoreResult<()> {
    match (transition_for(action).permitted, actor.user_type) {
        (Permitted::AnyPartner, UserType::User) => Err(CoreError::forbidden(PARTNERS_ONLY)),
        (Permitted::AssignedPartner, UserType::User) => {
            Err(CoreError::forbidden(ASSIGNED_PARTNER_ONLY))
        }
        _ => Ok(()),
    }
}

/// Decides whether `actor` may perform `action` on `order`.
///
/// Returns the status the order moves to, or the reason it may not.
/// Does not modify the order.
pub fn decide(order: &Order, action: OrderAction, actor: &User) -> CoreResult<OrderStatus> {
    let transition = transition_for(action);

    check_permission(order, actor, transition.permitted)?;

    if !transition.from.contains(&order.status) {
        return Err(CoreError::InvalidTransition {
            order_id: order.id.clone(),
            status: order.status,
            action,
        });
    }

    Ok(transition.to)
}

/// Applies `action` to `order` if the transition table allows it.
///
/// On success the status and `updated_at` are updated, and an accepting
/// partner is recorded as the order's partner. On failure the order is
/// left untouched.
pub fn apply(
    order: &mut Order,
    action: OrderAction,
    actor: &User,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    let next = decide(order, action, actor)?;

    if action == OrderAction::Accept {
        order.partner_id = Some(actor.id.clone());
    }
    order.status = next;
    order.updated_at = now;

    Ok(())
}

/// Lists the actions `actor` could take on `order` right now.
pub fn allowed_actions(order: &Order, actor: &User) -> Vec<OrderAction> {
    OrderAction::ALL
        .into_iter()
        .filter(|action| decide(order, *action, actor).is_ok())
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{DeliveryLocation, OrderDraft, PackageSize};

    fn user(id: &str, user_type: UserType) -> User {
        User {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{}@example.com", id),
            user_type,
        }
    }

    fn pending_order(owner: &str) -> Order {
        let draft = OrderDraft {
            pickup_location: DeliveryLocation::new("p", 1.0, 1.0, "Pickup"),
            delivery_location: DeliveryLocation::new("d", 1.1, 1.1, "Dropoff"),
            package_size: PackageSize::Small,
            amount: Money::from_cents(1200),
        };
        Order::from_draft("o-1".to_string(), owner, draft, Utc::now())
    }

    #[test]
    fn test_partner_accepts_pending_order() {
        let partner = user("p1", UserType::Partner);
        let mut order = pending_order("u1");
        let later = order.created_at + chrono::Duration::seconds(5);

        apply(&mut order, OrderAction::Accept, &partner, later).unwrap();

        assert_eq!(order.status, OrderStatus::Accepted);
        assert_eq!(order.partner_id.as_deref(), Some("p1"));
        assert_eq!(order.updated_at, later);
    }

    #[test]
    fn test_sender_cannot_accept() {
        let sender = user("u1", UserType::User);
        let mut order = pending_order("u1");
        let before = order.clone();

        let err = apply(&mut order, OrderAction::Accept, &sender, Utc::now()).unwrap_err();

        assert!(matches!(err, CoreError::Forbidden { .. }));
        assert_eq!(order, before);
    }

    #[test]
    fn test_accept_requires_pending() {
        let partner = user("p1", UserType::Partner);
        let mut order = pending_order("u1");
        order.status = OrderStatus::Delivered;
        order.partner_id = Some("p0".to_string());

        let err = decide(&order, OrderAction::Accept, &partner).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                status: OrderStatus::Delivered,
                action: OrderAction::Accept,
                ..
            }
        ));
    }

    #[test]
    fn test_full_happy_path() {
        let partner = user("p1", UserType::Partner);
        let mut order = pending_order("u1");

        for action in [OrderAction::Accept, OrderAction::StartTransit, OrderAction::Deliver] {
            apply(&mut order, action, &partner, Utc::now()).unwrap();
        }

        assert_eq!(order.status, OrderStatus::Delivered);
        assert!(allowed_actions(&order, &partner).is_empty());
    }

    #[test]
    fn test_only_assigned_partner_advances() {
        let p1 = user("p1", UserType::Partner);
        let p2 = user("p2", UserType::Partner);
        let mut order = pending_order("u1");
        apply(&mut order, OrderAction::Accept, &p1, Utc::now()).unwrap();

        let err = decide(&order, OrderAction::StartTransit, &p2).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
    }

    #[test]
    fn test_cancel_permissions() {
        let owner = user("u1", UserType::User);
        let stranger = user("u2", UserType::User);
        let p1 = user("p1", UserType::Partner);
        let p2 = user("p2", UserType::Partner);

        let mut order = pending_order("u1");
        apply(&mut order, OrderAction::Accept, &p1, Utc::now()).unwrap();

        assert_eq!(
            decide(&order, OrderAction::Cancel, &owner).unwrap(),
            OrderStatus::Cancelled
        );
        assert_eq!(
            decide(&order, OrderAction::Cancel, &p1).unwrap(),
            OrderStatus::Cancelled
        );
        assert!(matches!(
            decide(&order, OrderAction::Cancel, &stranger),
            Err(CoreError::Forbidden { .. })
        ));
        assert!(matches!(
            decide(&order, OrderAction::Cancel, &p2),
            Err(CoreError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_terminal_orders_cannot_be_cancelled() {
        let owner = user("u1", UserType::User);
        let mut order = pending_order("u1");
        apply(&mut order, OrderAction::Cancel, &owner, Utc::now()).unwrap();

        assert!(matches!(
            decide(&order, OrderAction::Cancel, &owner),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_transition_table_matches_actions() {
        for action in OrderAction::ALL {
            assert_eq!(transition_for(action).action, action);
        }
    }

    #[test]
    fn test_check_role() {
        let sender = user("u1", UserType::User);
        let partner = user("p1", UserType::Partner);

        let err = check_role(OrderAction::Accept, &sender).unwrap_err();
        assert_eq!(err.to_string(), "Only delivery partners can accept orders");
        assert!(check_role(OrderAction::Deliver, &sender).is_err());
        assert!(check_role(OrderAction::Cancel, &sender).is_ok());

        for action in OrderAction::ALL {
            assert!(check_role(action, &partner).is_ok());
        }
    }

    #[test]
    fn test_allowed_actions_for_pending() {
        let owner = user("u1", UserType::User);
        let partner = user("p1", UserType::Partner);
        let order = pending_order("u1");

        assert_eq!(allowed_actions(&order, &owner), vec![OrderAction::Cancel]);
        assert_eq!(allowed_actions(&order, &partner), vec![OrderAction::Accept]);
    }
}
