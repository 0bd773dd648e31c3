use axum::{extract::State, Json};

use crate::auth::CurrentIdentity;
use crate::errors::AppError;
use crate::insights::service::{get_industry_insight, InsightLookup};
use crate::state::AppState;

/// GET /api/v1/insights/me
pub async fn handle_get_my_insight(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<InsightLookup>, AppError> {
    let lookup =
        get_industry_insight(state.store.as_ref(), &state.insights, identity.as_ref()).await?;
    Ok(Json(lookup))
}
