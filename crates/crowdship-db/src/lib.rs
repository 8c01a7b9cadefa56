//! # crowdship-db: Local Persistence for Crowdship
//!
//! This crate stores all client state in a device-local SQLite key-value
//! store, one JSON value per key, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Crowdship Data Flow                              │
//! │                                                                         │
//! │  OrderService::accept_order                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   crowdship-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ KvRepository   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepository│    │ 0001_kv_     │  │   │
//! │  │   │               │    │ SessionRepo…   │    │   store.sql  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │       <platform data dir>/crowdship.db  (table kv_store)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Key-value, session, order and settings repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crowdship_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/crowdship.db")).await?;
//!
//! let snapshot = db.orders().load().await?;
//! db.orders().save(&snapshot.orders, snapshot.version).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::keys;
pub use repository::{
    KvRepository, OrderRepository, OrderSnapshot, SessionRepository, SettingsRepository,
    Versioned, ABSENT_VERSION,
};
