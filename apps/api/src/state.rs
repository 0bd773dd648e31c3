use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::insights::generator::InsightGenerator;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub insights: InsightGenerator,
    pub tokens: TokenVerifier,
    pub config: Config,
}
