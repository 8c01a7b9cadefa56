//! # Domain Types
//!
//! Core domain types used throughout Crowdship.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │      Order      │   │ DeliveryLocation│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id             │       │
//! │  │  name, email    │   │  user_id        │   │  latitude       │       │
//! │  │  user_type      │   │  partner_id?    │   │  longitude      │       │
//! │  └─────────────────┘   │  status, amount │   │  address        │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    UserType     │   │   OrderStatus   │   │   PackageSize   │       │
//! │  │  User           │   │  Pending        │   │  Small          │       │
//! │  │  Partner        │   │  Accepted       │   │  Medium         │       │
//! │  └─────────────────┘   │  InTransit      │   │  Large          │       │
//! │                        │  Delivered      │   └─────────────────┘       │
//! │                        │  Cancelled      │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stored Shape
//! Every type here is persisted as JSON in the local key-value store.
//! Field names are camelCase (`userId`, `partnerId`, `createdAt`) and the
//! enums use their lowercase wire names (`in_transit`, `partner`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// The role a signed-in account plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Sending customer: creates orders.
    User,
    /// Delivery partner: browses and accepts pending orders.
    Partner,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::User => "user",
            UserType::Partner => "partner",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(UserType::User),
            "partner" => Ok(UserType::Partner),
            _ => Err(ValidationError::InvalidFormat {
                field: "userType".to_string(),
                reason: "must be one of: user, partner".to_string(),
            }),
        }
    }
}

/// The signed-in account.
///
/// Fabricated client-side at login/register; there is no credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
}

impl User {
    #[inline]
    pub fn is_partner(&self) -> bool {
        self.user_type == UserType::Partner
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Where an order is in its lifecycle.
///
/// ```text
///  Pending ──accept──► Accepted ──start_transit──► InTransit ──deliver──► Delivered
///     │                    │                           │
///     └────────cancel──────┴───────────cancel──────────┴──────────────► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, waiting for a partner.
    Pending,
    /// Claimed by a partner.
    Accepted,
    /// Picked up and on the way.
    InTransit,
    /// Handed over. Terminal.
    Delivered,
    /// Called off by the sender or the assigned partner. Terminal.
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Accepted or in transit: a partner is working on it.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Accepted | OrderStatus::InTransit)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown order status '{}'", s),
            })
    }
}

// =============================================================================
// Package Size
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PackageSize {
    Small,
    Medium,
    Large,
}

impl Default for PackageSize {
    fn default() -> Self {
        PackageSize::Medium
    }
}

impl fmt::Display for PackageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PackageSize::Small => "small",
            PackageSize::Medium => "medium",
            PackageSize::Large => "large",
        })
    }
}

// =============================================================================
// Delivery Location
// =============================================================================

/// A pickup or drop-off point attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryLocation {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl DeliveryLocation {
    pub fn new(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        address: impl Into<String>,
    ) -> Self {
        DeliveryLocation {
            id: id.into(),
            latitude,
            longitude,
            address: address.into(),
        }
    }

    /// Returns the point as bare coordinates.
    #[inline]
    pub fn coordinates(&self) -> crate::geo::Coordinates {
        crate::geo::Coordinates::new(self.latitude, self.longitude)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A shipment request tracked through its status lifecycle.
///
/// Orders are never physically deleted; they end in `Delivered` or
/// `Cancelled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// The sender who created the order.
    pub user_id: String,
    /// The partner carrying it; `None` while pending.
    pub partner_id: Option<String>,
    pub pickup_location: DeliveryLocation,
    pub delivery_location: DeliveryLocation,
    pub status: OrderStatus,
    pub package_size: PackageSize,
    /// Price offered for the delivery, in minor units.
    pub amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a fresh pending order from a validated draft.
    ///
    /// `created_at` and `updated_at` are both set to `now`.
    pub fn from_draft(id: String, owner_id: &str, draft: OrderDraft, now: DateTime<Utc>) -> Self {
        Order {
            id,
            user_id: owner_id.to_string(),
            partner_id: None,
            pickup_location: draft.pickup_location,
            delivery_location: draft.delivery_location,
            status: OrderStatus::Pending,
            package_size: draft.package_size,
            amount: draft.amount,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    #[inline]
    pub fn is_assigned_to(&self, partner_id: &str) -> bool {
        self.partner_id.as_deref() == Some(partner_id)
    }

    /// Unclaimed work: pending with no partner.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == OrderStatus::Pending && self.partner_id.is_none()
    }

    /// Straight-line distance between pickup and drop-off, in kilometres.
    pub fn distance_km(&self) -> f64 {
        self.pickup_location
            .coordinates()
            .distance_km(&self.delivery_location.coordinates())
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// Everything a sender supplies when creating an order.
///
/// The ID, owner, status, partner and timestamps are filled in by the
/// order store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub pickup_location: DeliveryLocation,
    pub delivery_location: DeliveryLocation,
    #[serde(default)]
    pub package_size: PackageSize,
    pub amount: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> OrderDraft {
        OrderDraft {
            pickup_location: DeliveryLocation::new("a", 37.7749, -122.4194, "1 Market St"),
            delivery_location: DeliveryLocation::new("b", 37.8044, -122.2712, "2 Broadway"),
            package_size: PackageSize::Medium,
            amount: Money::from_major_minor(20, 0),
        }
    }

    #[test]
    fn test_from_draft_is_pending_and_unassigned() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let order = Order::from_draft("o-1".to_string(), "u-1", draft(), now);

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.partner_id, None);
        assert_eq!(order.user_id, "u-1");
        assert_eq!(order.created_at, order.updated_at);
        assert!(order.is_available());
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&OrderStatus::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");
        assert_eq!("in_transit".parse::<OrderStatus>().unwrap(), OrderStatus::InTransit);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_active_statuses() {
        assert!(OrderStatus::Accepted.is_active());
        assert!(OrderStatus::InTransit.is_active());
        assert!(!OrderStatus::Pending.is_active());
        assert!(!OrderStatus::Delivered.is_active());
    }

    #[test]
    fn test_order_json_uses_camel_case() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let order = Order::from_draft("o-1".to_string(), "u-1", draft(), now);
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["userId"], "u-1");
        assert!(value["partnerId"].is_null());
        assert_eq!(value["packageSize"], "medium");
        assert_eq!(value["pickupLocation"]["address"], "1 Market St");
        assert_eq!(value["amount"], 2000);
    }

    #[test]
    fn test_user_type_parse() {
        assert_eq!("Partner".parse::<UserType>().unwrap(), UserType::Partner);
        assert!("admin".parse::<UserType>().is_err());
    }

    #[test]
    fn test_package_size_default() {
        assert_eq!(PackageSize::default(), PackageSize::Medium);
    }
}
