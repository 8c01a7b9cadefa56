//! # Session Repository
//!
//! The signed-in user record, stored under the `user` key.

use crowdship_core::User;
use tracing::{debug, warn};

use super::kv::KvRepository;
use super::keys;
use crate::error::{DbError, DbResult};

/// Repository for the current user record.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    kv: KvRepository,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(kv: KvRepository) -> Self {
        SessionRepository { kv }
    }

    /// Loads the stored user.
    ///
    /// ## Returns
    /// * `Ok(Some(user))` - a session was persisted
    /// * `Ok(None)` - nobody is signed in, or the record is unreadable
    ///
    /// An unreadable record is logged and treated as signed out; the next
    /// login overwrites it.
    pub async fn load(&self) -> DbResult<Option<User>> {
        match self.kv.get_json::<User>(keys::USER).await {
            Ok(stored) => Ok(stored.map(|s| s.value)),
            Err(DbError::Serialization(reason)) => {
                warn!(key = keys::USER, %reason, "Discarding unreadable session record");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Persists `user` as the current session.
    pub async fn save(&self, user: &User) -> DbResult<()> {
        debug!(user_id = %user.id, "Saving session");
        self.kv.put_json(keys::USER, user).await?;
        Ok(())
    }

    /// Removes the stored session.
    pub async fn clear(&self) -> DbResult<()> {
        debug!("Clearing session");
        self.kv.delete(keys::USER).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crowdship_core::UserType;

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            name: "ana".to_string(),
            email: "ana@example.com".to_string(),
            user_type: UserType::Partner,
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let session = db.session();

        assert_eq!(session.load().await.unwrap(), None);

        session.save(&user()).await.unwrap();
        assert_eq!(session.load().await.unwrap(), Some(user()));

        session.clear().await.unwrap();
        assert_eq!(session.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stored_shape() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.session().save(&user()).await.unwrap();

        let raw = db.kv().get(keys::USER).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw.value).unwrap();
        assert_eq!(json["userType"], "partner");
        assert_eq!(json["email"], "ana@example.com");
    }

    #[tokio::test]
    async fn test_corrupt_record_is_signed_out() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv().put(keys::USER, "{\"id\":").await.unwrap();

        assert_eq!(db.session().load().await.unwrap(), None);
    }
}
