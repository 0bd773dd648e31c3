//! Profile flows: first-use creation, onboarding status and the
//! transactional profile update.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::Identity;
use crate::errors::AppError;
use crate::insights::generator::InsightGenerator;
use crate::models::insight::{IndustryInsight, NewIndustryInsight};
use crate::models::user::{NewUser, ProfileUpdate, User};
use crate::store::{Store, UnitOfWork};

#[derive(Debug, Serialize)]
pub struct OnboardingStatus {
    pub is_onboarded: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateOutcome {
    pub success: bool,
    pub updated_user: User,
    pub industry_insight: IndustryInsight,
}

/// Returns the caller's user row, creating it from the identity's profile on
/// first use. Safe to call on every request.
pub async fn ensure_profile(
    store: &dyn Store,
    identity: Option<&Identity>,
) -> Result<User, AppError> {
    let identity = identity.ok_or(AppError::Unauthorized)?;

    if let Some(user) = store.find_user(&identity.subject).await? {
        return Ok(user);
    }

    let email = identity
        .profile
        .primary_email
        .clone()
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Identity has no primary email".to_string()))?;

    let user = store
        .create_user_if_absent(NewUser {
            auth_subject: identity.subject.clone(),
            email,
            name: identity.profile.display_name(),
            image_url: identity.profile.image_url.clone(),
        })
        .await?;

    info!(subject = %identity.subject, "Profile ensured for user {}", user.id);
    Ok(user)
}

/// Reports whether the caller has picked an industry.
pub async fn onboarding_status(
    store: &dyn Store,
    identity: Option<&Identity>,
) -> Result<OnboardingStatus, AppError> {
    let identity = identity.ok_or(AppError::Unauthorized)?;

    let user = store
        .find_user(&identity.subject)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(OnboardingStatus {
        is_onboarded: user.is_onboarded(),
    })
}

/// Stores the onboarding profile and makes sure an insight exists for its
/// industry, atomically and within `budget`.
pub async fn update_profile(
    store: &dyn Store,
    generator: &InsightGenerator,
    identity: Option<&Identity>,
    update: ProfileUpdate,
    budget: Duration,
) -> Result<ProfileUpdateOutcome, AppError> {
    let identity = identity.ok_or(AppError::Unauthorized)?;

    let user = store
        .find_user(&identity.subject)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if update.industry.trim().is_empty() {
        return Err(AppError::Validation("Industry is required".to_string()));
    }

    let result = tokio::time::timeout(
        budget,
        run_profile_update(store, generator, user.id, &update),
    )
    .await;

    let (updated_user, industry_insight) = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            error!(subject = %identity.subject, industry = %update.industry, "Profile update aborted: {e}");
            return Err(AppError::UpdateFailed);
        }
        Err(_) => {
            // The dropped unit of work rolls back.
            error!(
                subject = %identity.subject,
                industry = %update.industry,
                "Profile update exceeded its {}s budget",
                budget.as_secs_f32()
            );
            return Err(AppError::UpdateFailed);
        }
    };

    info!(subject = %identity.subject, industry = %update.industry, "Profile updated");
    Ok(ProfileUpdateOutcome {
        success: true,
        updated_user,
        industry_insight,
    })
}

/// One transaction: begin, apply, then commit or roll back.
async fn run_profile_update(
    store: &dyn Store,
    generator: &InsightGenerator,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> Result<(User, IndustryInsight), AppError> {
    let mut uow = store.begin().await?;
    match apply_profile_update(uow.as_mut(), generator, user_id, update).await {
        Ok(outcome) => {
            uow.commit().await?;
            Ok(outcome)
        }
        Err(e) => {
            discard(uow).await;
            Err(e)
        }
    }
}

/// The unit of work body. Every read and write goes through `uow`.
async fn apply_profile_update(
    uow: &mut dyn UnitOfWork,
    generator: &InsightGenerator,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> Result<(User, IndustryInsight), AppError> {
    let insight = match uow.find_insight(&update.industry).await? {
        Some(existing) => existing,
        None => {
            let metrics = generator.generate(&update.industry).await?;
            uow.insert_insight(NewIndustryInsight::new(&update.industry, metrics, Utc::now()))
                .await?
        }
    };

    let user = uow.update_profile(user_id, update).await?;
    Ok((user, insight))
}

async fn discard(uow: Box<dyn UnitOfWork>) {
    if let Err(e) = uow.rollback().await {
        warn!("Rollback failed: {e}");
    }
}
