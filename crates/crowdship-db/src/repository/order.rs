//! # Order Repository
//!
//! The whole order collection, stored as one JSON array under the `orders`
//! key.
//!
//! ## Write Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load()  ──► OrderSnapshot { orders, version: v }                       │
//! │                  │                                                      │
//! │                  ▼  (mutate a copy in memory)                           │
//! │  save(&orders, v)                                                       │
//! │      ├── still at v  → stored, returns v + 1                            │
//! │      └── moved past v → DbError::VersionConflict                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The repository never merges. Callers that get a conflict reload and
//! re-apply their change to the fresh snapshot.

use crowdship_core::Order;
use tracing::{debug, warn};

use super::keys;
use super::kv::{KvRepository, ABSENT_VERSION};
use crate::error::{DbError, DbResult};

/// The order collection as read from storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderSnapshot {
    pub orders: Vec<Order>,
    /// Version to pass back to [`OrderRepository::save`].
    pub version: i64,
}

/// Repository for the order collection.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    kv: KvRepository,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(kv: KvRepository) -> Self {
        OrderRepository { kv }
    }

    /// Loads the collection and its version.
    ///
    /// A missing key is an empty collection at version 0. An unreadable
    /// value is a `DbError::Serialization`: the stored collection is never
    /// reported as empty, so no save can replace it unseen.
    pub async fn load(&self) -> DbResult<OrderSnapshot> {
        let Some(raw) = self.kv.get(keys::ORDERS).await? else {
            debug!("No stored orders");
            return Ok(OrderSnapshot {
                orders: Vec::new(),
                version: ABSENT_VERSION,
            });
        };

        let orders = serde_json::from_str::<Vec<Order>>(&raw.value).map_err(|e| {
            warn!(
                key = keys::ORDERS,
                version = raw.version,
                error = %e,
                "Stored orders are unreadable"
            );
            DbError::from(e)
        })?;

        debug!(count = orders.len(), version = raw.version, "Loaded orders");
        Ok(OrderSnapshot {
            orders,
            version: raw.version,
        })
    }

    /// Stores `orders` if the collection is still at `expected_version`.
    ///
    /// Returns the new version, or `DbError::VersionConflict`.
    pub async fn save(&self, orders: &[Order], expected_version: i64) -> DbResult<i64> {
        let version = self
            .kv
            .compare_and_swap_json(keys::ORDERS, expected_version, orders)
            .await?;

        debug!(count = orders.len(), version, "Saved orders");
        Ok(version)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{TimeZone, Utc};
    use crowdship_core::{DeliveryLocation, Money, OrderDraft, OrderStatus, PackageSize};

    fn order(id: &str) -> Order {
        let draft = OrderDraft {
            pickup_location: DeliveryLocation::new("p", 37.774929, -122.419416, "1 Market St"),
            delivery_location: DeliveryLocation::new("d", 37.804364, -122.271114, "2 Broadway"),
            package_size: PackageSize::Large,
            amount: Money::from_cents(2550),
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        Order::from_draft(id.to_string(), "u-1", draft, now)
    }

    #[tokio::test]
    async fn test_empty_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let snapshot = db.orders().load().await.unwrap();

        assert!(snapshot.orders.is_empty());
        assert_eq!(snapshot.version, ABSENT_VERSION);
    }

    #[tokio::test]
    async fn test_persist_then_reload_is_identical() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let mut accepted = order("o-2");
        accepted.status = OrderStatus::Accepted;
        accepted.partner_id = Some("p-1".to_string());
        let orders = vec![order("o-1"), accepted];

        let version = repo.save(&orders, ABSENT_VERSION).await.unwrap();
        let snapshot = repo.load().await.unwrap();

        assert_eq!(snapshot.orders, orders);
        assert_eq!(snapshot.version, version);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let v1 = repo.save(&[order("o-1")], ABSENT_VERSION).await.unwrap();
        repo.save(&[order("o-1"), order("o-2")], v1).await.unwrap();

        let err = repo.save(&[order("o-3")], v1).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.load().await.unwrap().orders.len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_orders_are_an_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let version = db.kv().put("orders", "[{\"id\":").await.unwrap();

        let err = db.orders().load().await.unwrap_err();
        assert!(matches!(err, DbError::Serialization(_)));

        // Nothing was rewritten
        let raw = db.kv().get("orders").await.unwrap().unwrap();
        assert_eq!(raw.value, "[{\"id\":");
        assert_eq!(raw.version, version);
    }

    #[tokio::test]
    async fn test_legacy_decimal_amounts_load() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv().put("orders", LEGACY_ORDERS).await.unwrap();

        let snapshot = db.orders().load().await.unwrap();

        assert_eq!(snapshot.orders.len(), 1);
        assert_eq!(snapshot.orders[0].id, "abc");
        assert_eq!(snapshot.orders[0].amount, Money::from_cents(2450));
        assert_eq!(snapshot.orders[0].status, OrderStatus::Pending);
    }

    const LEGACY_ORDERS: &str = r#"[{
        "id": "abc",
        "userId": "u-1",
        "partnerId": null,
        "pickupLocation": {"id": "p", "latitude": 37.77, "longitude": -122.41, "address": "1 Market St"},
        "deliveryLocation": {"id": "d", "latitude": 37.80, "longitude": -122.27, "address": "2 Broadway"},
        "status": "pending",
        "packageSize": "small",
        "amount": 24.5,
        "createdAt": "2026-03-04T05:06:07.000Z",
        "updatedAt": "2026-03-04T05:06:07.000Z"
    }]"#;
}
