//! Insight generator — turns an industry name into validated insight metrics
//! via the completion oracle.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::insights::prompts::industry_insight_prompt;
use crate::llm_client::{strip_json_fences, CompletionOracle, LlmError};
use crate::models::insight::InsightMetrics;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("industry must not be empty")]
    EmptyIndustry,

    #[error("oracle unavailable: {0}")]
    OracleUnavailable(#[source] LlmError),

    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),
}

#[derive(Clone)]
pub struct InsightGenerator {
    oracle: Arc<dyn CompletionOracle>,
}

impl InsightGenerator {
    pub fn new(oracle: Arc<dyn CompletionOracle>) -> Self {
        Self { oracle }
    }

    /// Asks the oracle for insights on `industry`. Never touches the store.
    pub async fn generate(&self, industry: &str) -> Result<InsightMetrics, InsightError> {
        let industry = industry.trim();
        if industry.is_empty() {
            return Err(InsightError::EmptyIndustry);
        }

        let prompt = industry_insight_prompt(industry);
        let raw = self.oracle.complete(&prompt).await.map_err(|e| match e {
            LlmError::EmptyContent => InsightError::MalformedResponse(e.to_string()),
            other => InsightError::OracleUnavailable(other),
        })?;

        debug!(industry, bytes = raw.len(), "Oracle responded");
        parse_insight_response(&raw)
    }
}

/// Parses raw oracle text, tolerating only surrounding code fences.
pub fn parse_insight_response(raw: &str) -> Result<InsightMetrics, InsightError> {
    let cleaned = strip_json_fences(raw);
    let metrics: InsightMetrics = serde_json::from_str(cleaned)
        .map_err(|e| InsightError::MalformedResponse(e.to_string()))?;
    metrics.check().map_err(InsightError::MalformedResponse)?;
    Ok(metrics)
}
