//! Cache-or-generate lookup of the caller's industry insight.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::auth::Identity;
use crate::errors::AppError;
use crate::insights::generator::InsightGenerator;
use crate::models::insight::{IndustryInsight, NewIndustryInsight};
use crate::store::Store;

/// Result of an insight lookup. `NotOnboarded` is a normal outcome, not an error.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsightLookup {
    NotOnboarded,
    Ready { insight: IndustryInsight },
}

/// Returns the caller's industry insight, generating and storing it on first need.
///
/// Identity, profile and industry are all checked before the oracle is called.
pub async fn get_industry_insight(
    store: &dyn Store,
    generator: &InsightGenerator,
    identity: Option<&Identity>,
) -> Result<InsightLookup, AppError> {
    let identity = identity.ok_or(AppError::Unauthorized)?;

    let user = store
        .find_user(&identity.subject)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let Some(industry) = user.onboarded_industry() else {
        info!(subject = %identity.subject, "User has no industry set, skipping insights");
        return Ok(InsightLookup::NotOnboarded);
    };

    if let Some(insight) = store.find_insight(industry).await? {
        return Ok(InsightLookup::Ready { insight });
    }

    let metrics = generator.generate(industry).await.map_err(|e| {
        error!(
            subject = %identity.subject,
            industry,
            "Industry insight generation failed: {e}"
        );
        AppError::from(e)
    })?;

    let insight = store
        .insert_insight(NewIndustryInsight::new(industry, metrics, Utc::now()))
        .await?;

    info!(subject = %identity.subject, industry, "Generated industry insight");
    Ok(InsightLookup::Ready { insight })
}
