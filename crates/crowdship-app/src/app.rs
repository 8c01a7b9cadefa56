//! # App Bootstrap
//!
//! Builds every service from one config and one database handle. There is
//! no global state: the shell holds the [`App`] and hands out references.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing(config.log_filter)   RUST_LOG wins if set              │
//! │  2. config.ensure_data_dir()          create the DB's parent folder     │
//! │  3. Database::new(config.db_config()) open pool, run migrations         │
//! │  4. auth.restore()                    pick up the saved session         │
//! │  5. orders.reload()                   read the `orders` key             │
//! │  6. LocationService::new(provider)    fallback origin from config       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crowdship_core::User;
use crowdship_db::Database;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::{
    AuthService, LocationProvider, LocationService, OnboardingService, OrderService,
};

/// Every service, wired to one database.
#[derive(Debug, Clone)]
pub struct App {
    pub config: AppConfig,
    pub db: Database,
    pub auth: AuthService,
    pub orders: OrderService,
    pub location: LocationService,
    pub onboarding: OnboardingService,
}

impl App {
    /// Opens storage, restores saved state and constructs the services.
    pub async fn bootstrap(
        config: AppConfig,
        provider: Arc<dyn LocationProvider>,
    ) -> Result<App, ApiError> {
        config.validate()?;
        config.ensure_data_dir()?;

        info!(path = ?config.database_path, "Opening database");
        let db = Database::new(config.db_config()).await?;

        let auth = AuthService::new(&db);
        auth.restore().await?;

        // Unreadable orders keep the app usable with an empty list. The
        // store refuses writes until a reload succeeds.
        let orders = OrderService::new(&db);
        if let Err(e) = orders.reload().await {
            warn!(code = ?e.code, message = %e.message, "Failed to load orders");
        }

        let location = LocationService::new(provider).with_fallback(config.default_location);
        let onboarding = OnboardingService::new(&db);

        info!("Services initialized");

        Ok(App {
            config,
            db,
            auth,
            orders,
            location,
            onboarding,
        })
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.auth.current_user().await
    }

    /// Closes the database pool.
    pub async fn shutdown(&self) {
        self.db.close().await;
        info!("Shut down");
    }
}

/// Installs the global tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=crowdship=trace` - Show trace for crowdship crates only
/// - Otherwise `filter` (see [`crate::config::DEFAULT_LOG_FILTER`])
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
