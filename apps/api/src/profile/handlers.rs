use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::auth::CurrentIdentity;
use crate::errors::AppError;
use crate::models::user::User;
use crate::profile::service::{
    ensure_profile, onboarding_status, update_profile, OnboardingStatus, ProfileUpdateOutcome,
};
use crate::profile::validation::{validate_onboarding, OnboardingForm};
use crate::state::AppState;

/// POST /api/v1/users/me
///
/// Idempotent; creates the user row on first call.
pub async fn handle_ensure_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<User>, AppError> {
    let user = ensure_profile(state.store.as_ref(), identity.as_ref()).await?;
    Ok(Json(user))
}

/// GET /api/v1/users/me/onboarding-status
pub async fn handle_onboarding_status(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<OnboardingStatus>, AppError> {
    let status = onboarding_status(state.store.as_ref(), identity.as_ref()).await?;
    Ok(Json(status))
}

/// PUT /api/v1/users/me/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    form: Result<Json<OnboardingForm>, JsonRejection>,
) -> Result<Json<ProfileUpdateOutcome>, AppError> {
    let identity = identity.ok_or(AppError::Unauthorized)?;
    let Json(form) = form.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let update = validate_onboarding(&form).map_err(AppError::InvalidForm)?;

    let outcome = update_profile(
        state.store.as_ref(),
        &state.insights,
        Some(&identity),
        update,
        state.config.profile_update_timeout,
    )
    .await?;
    Ok(Json(outcome))
}
