//! # Settings Repository
//!
//! App-level flags. Currently only `hasCompletedOnboarding`.

use tracing::{debug, warn};

use super::keys;
use super::kv::KvRepository;
use crate::error::{DbError, DbResult};

/// Repository for app-level flags.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    kv: KvRepository,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(kv: KvRepository) -> Self {
        SettingsRepository { kv }
    }

    /// Whether onboarding has been completed. Absent or unreadable → `false`.
    pub async fn has_completed_onboarding(&self) -> DbResult<bool> {
        match self.kv.get_json::<bool>(keys::HAS_COMPLETED_ONBOARDING).await {
            Ok(stored) => Ok(stored.map(|s| s.value).unwrap_or(false)),
            Err(DbError::Serialization(reason)) => {
                warn!(key = keys::HAS_COMPLETED_ONBOARDING, %reason, "Unreadable onboarding flag");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Stores the onboarding flag.
    pub async fn set_completed_onboarding(&self, completed: bool) -> DbResult<()> {
        debug!(completed, "Saving onboarding flag");
        self.kv
            .put_json(keys::HAS_COMPLETED_ONBOARDING, &completed)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_onboarding_flag() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db.settings();

        assert!(!settings.has_completed_onboarding().await.unwrap());

        settings.set_completed_onboarding(true).await.unwrap();
        assert!(settings.has_completed_onboarding().await.unwrap());

        let raw = db.kv().get("hasCompletedOnboarding").await.unwrap().unwrap();
        assert_eq!(raw.value, "true");
    }
}
