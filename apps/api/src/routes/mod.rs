pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::insights::handlers as insights;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/users/me", post(profile::handle_ensure_profile))
        .route(
            "/api/v1/users/me/onboarding-status",
            get(profile::handle_onboarding_status),
        )
        .route(
            "/api/v1/users/me/profile",
            put(profile::handle_update_profile),
        )
        .route("/api/v1/insights/me", get(insights::handle_get_my_insight))
        .with_state(state)
}
