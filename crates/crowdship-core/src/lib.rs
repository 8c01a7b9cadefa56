//! # crowdship-core: Pure Order Logic for Crowdship
//!
//! This crate holds the domain model and every rule about how an order may
//! change. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Crowdship Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile shell (screens)                       │   │
//! │  │   Login ──► Create order ──► Available jobs ──► Track delivery │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 crowdship-app (services)                        │   │
//! │  │   AuthService, OrderService, LocationService, Onboarding        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ crowdship-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │ lifecycle │ │ views  │ │  geo   │  │   │
//! │  │   │  Order  │ │  Money  │ │ decide/   │ │ user / │ │ route, │  │   │
//! │  │   │  User   │ │         │ │ apply     │ │ avail. │ │ address│  │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                crowdship-db (Storage Layer)                     │   │
//! │  │          SQLite key-value store, versioned writes               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Order, DeliveryLocation, ...)
//! - [`money`] - Integer-cents amounts
//! - [`lifecycle`] - The order state machine and its permission rules
//! - [`views`] - Role-filtered projections of the order list
//! - [`geo`] - Distances, routes and address formatting
//! - [`validation`] - Input rules for credentials and drafts
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use crowdship_core::lifecycle::{self, OrderAction};
//! use crowdship_core::{DeliveryLocation, Money, Order, OrderDraft, OrderStatus, PackageSize, User, UserType};
//!
//! let draft = OrderDraft {
//!     pickup_location: DeliveryLocation::new("p", 40.71, -74.00, "City Hall"),
//!     delivery_location: DeliveryLocation::new("d", 40.75, -73.98, "Times Square"),
//!     package_size: PackageSize::Small,
//!     amount: Money::from_cents(1500),
//! };
//! let mut order = Order::from_draft("o-1".to_string(), "u-1", draft, Utc::now());
//!
//! let partner = User {
//!     id: "p-1".to_string(),
//!     name: "Pat".to_string(),
//!     email: "pat@example.com".to_string(),
//!     user_type: UserType::Partner,
//! };
//! lifecycle::apply(&mut order, OrderAction::Accept, &partner, Utc::now()).unwrap();
//!
//! assert_eq!(order.status, OrderStatus::Accepted);
//! assert_eq!(order.partner_id.as_deref(), Some("p-1"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod geo;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;
pub mod views;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::OrderAction;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum display name length, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum email length (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum pickup/delivery address length, in characters.
pub const MAX_ADDRESS_LENGTH: usize = 200;

/// Ceiling on a single order's amount: $10,000.00.
pub const MAX_ORDER_AMOUNT_CENTS: i64 = 1_000_000;

/// Maximum drafts accepted by one bulk create.
pub const MAX_BULK_ORDERS: usize = 50;
