//! # Order Service
//!
//! The order store: owns the in-memory order collection, applies lifecycle
//! rules and persists every change under the `orders` key.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  accept_order / cancel_order / create_order / ...                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  writer.lock()            one mutation at a time per service            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  copy = snapshot.orders ─► apply change (lifecycle checks) ─► Err? stop │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  repo.save(copy, snapshot.version)                                      │
//! │       ├── Ok(v')     ─► publish copy as the in-memory collection        │
//! │       ├── Conflict   ─► reload, re-apply to the fresh snapshot          │
//! │       │                 (at most MAX_WRITE_ATTEMPTS times)              │
//! │       └── Err        ─► in-memory collection untouched                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads never wait on storage: they clone from the published collection.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crowdship_core::lifecycle::{self, OrderAction};
use crowdship_core::validation::validate_order_draft;
use crowdship_core::views::{self, OrderSummary};
use crowdship_core::{CoreError, Order, OrderDraft, OrderStatus, User, ValidationError, MAX_BULK_ORDERS};
use crowdship_db::{Database, OrderRepository, OrderSnapshot};

use crate::error::ApiError;

/// Attempts per mutation before a version conflict is surfaced.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Order store.
#[derive(Debug, Clone)]
pub struct OrderService {
    repo: OrderRepository,
    state: Arc<RwLock<OrderSnapshot>>,
    writer: Arc<Mutex<()>>,
}

impl OrderService {
    /// Creates an empty store. Call [`OrderService::reload`] to read the
    /// persisted collection.
    pub fn new(db: &Database) -> Self {
        OrderService {
            repo: db.orders(),
            state: Arc::new(RwLock::new(OrderSnapshot::default())),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a store and loads the persisted collection into it.
    pub async fn load(db: &Database) -> Result<Self, ApiError> {
        let service = OrderService::new(db);
        service.reload().await?;
        Ok(service)
    }

    /// Re-reads the collection from storage, replacing the in-memory copy.
    pub async fn reload(&self) -> Result<(), ApiError> {
        let _writer = self.writer.lock().await;
        let snapshot = self.repo.load().await?;

        info!(count = snapshot.orders.len(), version = snapshot.version, "Orders loaded");
        *self.state.write().await = snapshot;
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a pending order owned by `caller`.
    pub async fn create_order(
        &self,
        caller: Option<&User>,
        draft: OrderDraft,
    ) -> Result<Order, ApiError> {
        let user = require_user(caller)?;
        validate_order_draft(&draft)?;

        let order = Order::from_draft(Uuid::new_v4().to_string(), &user.id, draft, Utc::now());

        let created = self
            .mutate("create_order", |orders| {
                orders.push(order.clone());
                Ok(order.clone())
            })
            .await?;

        info!(order_id = %created.id, user_id = %user.id, amount = %created.amount, "Order created");
        Ok(created)
    }

    /// Creates several orders in one write. Either all are stored or none.
    pub async fn create_orders(
        &self,
        caller: Option<&User>,
        drafts: Vec<OrderDraft>,
    ) -> Result<Vec<Order>, ApiError> {
        let user = require_user(caller)?;

        if drafts.is_empty() {
            return Err(ValidationError::Empty {
                field: "orders".to_string(),
            }
            .into());
        }
        if drafts.len() > MAX_BULK_ORDERS {
            return Err(ApiError::validation(format!(
                "At most {} orders can be created at once",
                MAX_BULK_ORDERS
            )));
        }
        for draft in &drafts {
            validate_order_draft(draft)?;
        }

        let now = Utc::now();
        let new_orders: Vec<Order> = drafts
            .into_iter()
            .map(|draft| Order::from_draft(Uuid::new_v4().to_string(), &user.id, draft, now))
            .collect();

        let created = self
            .mutate("create_orders", |orders| {
                orders.extend(new_orders.iter().cloned());
                Ok(new_orders.clone())
            })
            .await?;

        info!(count = created.len(), user_id = %user.id, "Orders created");
        Ok(created)
    }

    /// A partner claims a pending order.
    pub async fn accept_order(&self, caller: Option<&User>, order_id: &str) -> Result<Order, ApiError> {
        self.advance_order(caller, order_id, OrderAction::Accept).await
    }

    /// The owning sender or the assigned partner calls an order off.
    pub async fn cancel_order(&self, caller: Option<&User>, order_id: &str) -> Result<Order, ApiError> {
        self.advance_order(caller, order_id, OrderAction::Cancel).await
    }

    /// Applies `action` to an order, subject to the lifecycle's role and
    /// status rules.
    pub async fn advance_order(
        &self,
        caller: Option<&User>,
        order_id: &str,
        action: OrderAction,
    ) -> Result<Order, ApiError> {
        let user = require_user(caller)?;
        lifecycle::check_role(action, user)?;

        let updated = self
            .mutate(action.as_str(), |orders| {
                let order = find_mut(orders, order_id)?;
                lifecycle::apply(order, action, user, Utc::now())?;
                Ok(order.clone())
            })
            .await?;

        info!(
            order_id = %updated.id,
            user_id = %user.id,
            action = %action,
            status = %updated.status,
            "Order updated"
        );
        Ok(updated)
    }

    /// Overwrites an order's status with no role or transition check.
    ///
    /// For administrative corrections. Caller-driven progress goes through
    /// [`OrderService::advance_order`].
    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let updated = self
            .mutate("update_order_status", |orders| {
                let order = find_mut(orders, order_id)?;
                order.status = status;
                order.updated_at = Utc::now();
                Ok(order.clone())
            })
            .await?;

        warn!(order_id = %order_id, status = %status, "Order status overwritten");
        Ok(updated)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Looks up one order.
    pub async fn get_order_by_id(&self, order_id: &str) -> Option<Order> {
        self.state
            .read()
            .await
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
    }

    /// The full collection.
    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    /// Orders the caller created (sender) or carries (partner).
    pub async fn user_orders(&self, caller: Option<&User>) -> Vec<Order> {
        views::user_orders(&self.state.read().await.orders, caller)
    }

    /// Pending, unassigned orders. Empty unless the caller is a partner.
    pub async fn available_orders(&self, caller: Option<&User>) -> Vec<Order> {
        views::available_orders(&self.state.read().await.orders, caller)
    }

    /// Dashboard counts over the caller's orders.
    pub async fn summary(&self, caller: Option<&User>) -> OrderSummary {
        OrderSummary::from_orders(&self.user_orders(caller).await)
    }

    /// What the caller may do to an order right now.
    pub async fn allowed_actions(&self, caller: Option<&User>, order_id: &str) -> Vec<OrderAction> {
        match (caller, self.get_order_by_id(order_id).await) {
            (Some(user), Some(order)) => lifecycle::allowed_actions(&order, user),
            _ => Vec::new(),
        }
    }

    // =========================================================================
    // Write protocol
    // =========================================================================

    /// Runs `change` against a copy of the collection and stores the result.
    ///
    /// `change` may run more than once: after a version conflict it is
    /// re-applied to the freshly loaded collection, so every rule it checks
    /// is checked again against current data.
    async fn mutate<T, F>(&self, op: &str, mut change: F) -> Result<T, ApiError>
    where
        F: FnMut(&mut Vec<Order>) -> Result<T, CoreError>,
    {
        let _writer = self.writer.lock().await;
        let mut base = self.state.read().await.clone();

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut orders = base.orders.clone();
            let output = change(&mut orders)?;

            match self.repo.save(&orders, base.version).await {
                Ok(version) => {
                    debug!(op, attempt, version, "Orders persisted");
                    *self.state.write().await = OrderSnapshot { orders, version };
                    return Ok(output);
                }
                Err(e) if e.is_conflict() => {
                    warn!(op, attempt, "Orders changed by another writer, reloading");
                    base = self.repo.load().await?;
                    *self.state.write().await = base.clone();
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApiError::conflict(format!(
            "Could not save orders after {} attempts, please try again",
            MAX_WRITE_ATTEMPTS
        )))
    }
}

fn require_user(caller: Option<&User>) -> Result<&User, CoreError> {
    caller.ok_or(CoreError::Unauthenticated)
}

fn find_mut<'a>(orders: &'a mut [Order], order_id: &str) -> Result<&'a mut Order, CoreError> {
    orders
        .iter_mut()
        .find(|o| o.id == order_id)
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
