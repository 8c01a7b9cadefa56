//! # Auth Service
//!
//! Holds the one signed-in user and keeps it in the `user` key.
//!
//! There is no credential store: login and register validate the form and
//! fabricate a user record on the device.
//!
//! ## Session Lifecycle
//! ```text
//!   startup ──► restore() ──► Some(user) ──► signed in
//!                   │
//!                   └──► None ──► login()/register() ──► signed in
//!                                                           │
//!                                          logout() ◄───────┘
//! ```

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crowdship_core::validation::{
    validate_email, validate_name, validate_password, validate_password_confirmation,
};
use crowdship_core::{User, UserType, ValidationError};
use crowdship_db::{Database, SessionRepository};

use crate::error::ApiError;

/// Sign-up form contents.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub user_type: UserType,
    /// Required for partners ("bike", "car", ...).
    #[serde(default)]
    pub vehicle_type: Option<String>,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_password_confirmation(&self.password, &self.confirm_password)?;

        if self.user_type == UserType::Partner {
            let vehicle = self.vehicle_type.as_deref().map(str::trim).unwrap_or("");
            if vehicle.is_empty() {
                return Err(ValidationError::required("vehicleType"));
            }
        }

        Ok(())
    }
}

/// Auth state holder.
#[derive(Debug, Clone)]
pub struct AuthService {
    session: SessionRepository,
    current: Arc<RwLock<Option<User>>>,
}

impl AuthService {
    /// Creates a signed-out service. Call [`AuthService::restore`] to pick
    /// up a persisted session.
    pub fn new(db: &Database) -> Self {
        AuthService {
            session: db.session(),
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Loads the persisted session, if any, and makes it current.
    pub async fn restore(&self) -> Result<Option<User>, ApiError> {
        let mut current = self.current.write().await;
        let user = self.session.load().await?;

        match &user {
            Some(u) => info!(user_id = %u.id, user_type = %u.user_type, "Session restored"),
            None => info!("No saved session"),
        }

        *current = user.clone();
        Ok(user)
    }

    /// Signs in with an email and password.
    ///
    /// The display name is the part of the email before '@'.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> Result<User, ApiError> {
        validate_email(email)?;
        validate_password(password)?;

        let email = email.trim();
        let name = email.split('@').next().unwrap_or(email).to_string();

        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email: email.to_string(),
            user_type,
        };

        self.sign_in(user).await
    }

    /// Creates an account from the sign-up form and signs it in.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, ApiError> {
        request.validate()?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            user_type: request.user_type,
        };

        self.sign_in(user).await
    }

    /// Clears the persisted session, then the in-memory one.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let mut current = self.current.write().await;
        self.session.clear().await?;

        if let Some(user) = current.take() {
            info!(user_id = %user.id, "Signed out");
        }
        Ok(())
    }

    /// Snapshot of the signed-in user.
    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    // Persist first so a failed write leaves the previous session current.
    async fn sign_in(&self, user: User) -> Result<User, ApiError> {
        let mut current = self.current.write().await;
        self.session.save(&user).await?;

        info!(user_id = %user.id, user_type = %user.user_type, "Signed in");
        *current = Some(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crowdship_db::DbConfig;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn register_request(user_type: UserType, vehicle: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: "Pat Rider".to_string(),
            email: "pat@example.com".to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
            user_type,
            vehicle_type: vehicle.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_login_fabricates_user() {
        let auth = AuthService::new(&db().await);

        let user = auth
            .login("ana@example.com", "pw", UserType::User)
            .await
            .unwrap();

        assert_eq!(user.name, "ana");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.user_type, UserType::User);
        assert!(Uuid::parse_str(&user.id).is_ok());
        assert_eq!(auth.current_user().await, Some(user));
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let auth = AuthService::new(&db().await);

        let err = auth.login("", "pw", UserType::User).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = auth
            .login("ana@example.com", "", UserType::User)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let db = db().await;
        let user = AuthService::new(&db)
            .login("ana@example.com", "pw", UserType::Partner)
            .await
            .unwrap();

        let restarted = AuthService::new(&db);
        assert_eq!(restarted.current_user().await, None);
        assert_eq!(restarted.restore().await.unwrap(), Some(user.clone()));
        assert_eq!(restarted.current_user().await, Some(user));
    }

    #[tokio::test]
    async fn test_logout_clears_persisted_session() {
        let db = db().await;
        let auth = AuthService::new(&db);
        auth.login("ana@example.com", "pw", UserType::User)
            .await
            .unwrap();

        auth.logout().await.unwrap();

        assert_eq!(auth.current_user().await, None);
        assert_eq!(AuthService::new(&db).restore().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_register() {
        let auth = AuthService::new(&db().await);

        let user = auth
            .register(register_request(UserType::Partner, Some("bike")))
            .await
            .unwrap();

        assert_eq!(user.name, "Pat Rider");
        assert!(user.is_partner());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_forms() {
        let auth = AuthService::new(&db().await);

        let err = auth
            .register(register_request(UserType::Partner, None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("vehicleType"));

        let mut mismatch = register_request(UserType::User, None);
        mismatch.confirm_password = "other".to_string();
        let err = auth.register(mismatch).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert!(!auth.is_authenticated().await);
    }

    #[test]
    fn test_register_request_from_json() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@b.co","password":"x","confirmPassword":"x","userType":"user"}"#,
        )
        .unwrap();
        assert_eq!(request.user_type, UserType::User);
        assert_eq!(request.vehicle_type, None);
    }
}
