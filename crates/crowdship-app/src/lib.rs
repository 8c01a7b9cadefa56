//! # Crowdship App
//!
//! Service layer for the Crowdship mobile client: the signed-in user, the
//! order store, device location and the onboarding flag.
//!
//! ## Module Organization
//! ```text
//! crowdship_app/
//! ├── lib.rs            ◄─── You are here
//! ├── app.rs            ◄─── App bootstrap + tracing setup
//! ├── config.rs         ◄─── AppConfig (TOML + env)
//! ├── error.rs          ◄─── ApiError returned by every service call
//! └── services/
//!     ├── auth.rs       ◄─── Session (key: user)
//!     ├── orders.rs     ◄─── Order store (key: orders)
//!     ├── location.rs   ◄─── Current location, geocoding, routes
//!     └── onboarding.rs ◄─── First-run flag
//! ```
//!
//! ## Usage
//! ```no_run
//! use std::sync::Arc;
//! use crowdship_app::{init_tracing, App, AppConfig, FixedLocationProvider};
//! use crowdship_core::{geo::Coordinates, UserType};
//!
//! # async fn run() -> Result<(), crowdship_app::ApiError> {
//! let config = AppConfig::load(None)?;
//! init_tracing(&config.log_filter);
//!
//! let provider = Arc::new(FixedLocationProvider::new(Coordinates::new(40.7128, -74.0060)));
//! let app = App::bootstrap(config, provider).await?;
//!
//! let partner = app.auth.login("pia@example.com", "pw", UserType::Partner).await?;
//! for order in app.orders.available_orders(Some(&partner)).await {
//!     println!("{} {}", order.id, order.amount);
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod services;

pub use app::{init_tracing, App};
pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use services::{
    AuthService, FixedLocationProvider, LocationError, LocationProvider, LocationService,
    OnboardingService, OrderService, RegisterRequest,
};
