//! # Services
//!
//! The state holders the mobile shell talks to. Each one owns its own lock
//! and its own storage keys, so a slow order write never blocks an auth
//! read.
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌─────────────────┐ ┌───────────────────┐
//! │ AuthService  │ │ OrderService │ │ LocationService │ │ OnboardingService │
//! │              │ │              │ │                 │ │                   │
//! │ key: user    │ │ key: orders  │ │ (not persisted) │ │ key: hasCompleted │
//! │ RwLock<User> │ │ Mutex + CAS  │ │ RwLock<State>   │ │      Onboarding   │
//! └──────────────┘ └──────────────┘ └─────────────────┘ └───────────────────┘
//! ```

pub mod auth;
pub mod location;
pub mod onboarding;
pub mod orders;

pub use auth::{AuthService, RegisterRequest};
pub use location::{FixedLocationProvider, LocationError, LocationProvider, LocationService};
pub use onboarding::OnboardingService;
pub use orders::{OrderService, MAX_WRITE_ATTEMPTS};
