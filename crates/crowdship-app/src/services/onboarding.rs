//! First-run onboarding flag, stored under `hasCompletedOnboarding`.

use tracing::info;

use crowdship_db::{Database, SettingsRepository};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct OnboardingService {
    settings: SettingsRepository,
}

impl OnboardingService {
    pub fn new(db: &Database) -> Self {
        OnboardingService {
            settings: db.settings(),
        }
    }

    /// Whether the intro screens should be skipped.
    pub async fn has_completed(&self) -> Result<bool, ApiError> {
        Ok(self.settings.has_completed_onboarding().await?)
    }

    /// Marks onboarding as done. Idempotent.
    pub async fn complete(&self) -> Result<(), ApiError> {
        self.settings.set_completed_onboarding(true).await?;
        info!("Onboarding completed");
        Ok(())
    }

    /// Shows the intro screens again on next launch.
    pub async fn reset(&self) -> Result<(), ApiError> {
        self.settings.set_completed_onboarding(false).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdship_db::DbConfig;

    #[tokio::test]
    async fn test_onboarding_flag() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let onboarding = OnboardingService::new(&db);

        assert!(!onboarding.has_completed().await.unwrap());

        onboarding.complete().await.unwrap();
        onboarding.complete().await.unwrap();
        assert!(OnboardingService::new(&db).has_completed().await.unwrap());

        onboarding.reset().await.unwrap();
        assert!(!onboarding.has_completed().await.unwrap());
    }
}
