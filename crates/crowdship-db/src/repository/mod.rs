//! # Repository Module
//!
//! Typed access to the key-value store.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SessionRepository    OrderRepository     SettingsRepository           │
//! │   key "user"           key "orders"        key "hasCompletedOnboarding"│
//! │        │                    │                       │                   │
//! │        └────────────────────┼───────────────────────┘                   │
//! │                             ▼                                           │
//! │                       KvRepository                                      │
//! │          get / put / compare_and_swap / delete (+ JSON helpers)         │
//! │                             │                                           │
//! │                             ▼                                           │
//! │                     kv_store (SQLite)                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`KvRepository`] - Raw versioned key-value access
//! - [`SessionRepository`] - Signed-in user record
//! - [`OrderRepository`] - The order collection
//! - [`SettingsRepository`] - App-level flags

pub mod kv;
pub mod order;
pub mod session;
pub mod settings;

pub use kv::{KvRepository, Versioned, ABSENT_VERSION};
pub use order::{OrderRepository, OrderSnapshot};
pub use session::SessionRepository;
pub use settings::SettingsRepository;

/// Storage keys. Values under each key are plain JSON.
pub mod keys {
    /// Current signed-in user.
    pub const USER: &str = "user";
    /// The full order collection.
    pub const ORDERS: &str = "orders";
    /// Onboarding completion flag.
    pub const HAS_COMPLETED_ONBOARDING: &str = "hasCompletedOnboarding";
}
