use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Insights are considered fresh for one week after generation.
pub const INSIGHT_REFRESH_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketOutlook {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl DemandLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::High => "High",
            DemandLevel::Medium => "Medium",
            DemandLevel::Low => "Low",
        }
    }
}

impl FromStr for DemandLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(DemandLevel::High),
            "Medium" => Ok(DemandLevel::Medium),
            "Low" => Ok(DemandLevel::Low),
            other => Err(UnknownVariant {
                kind: "demand level",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MarketOutlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketOutlook::Positive => "Positive",
            MarketOutlook::Neutral => "Neutral",
            MarketOutlook::Negative => "Negative",
        }
    }
}

impl FromStr for MarketOutlook {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Positive" => Ok(MarketOutlook::Positive),
            "Neutral" => Ok(MarketOutlook::Neutral),
            "Negative" => Ok(MarketOutlook::Negative),
            other => Err(UnknownVariant {
                kind: "market outlook",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for MarketOutlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Salary band for one role, as reported by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub role: String,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub location: String,
}

/// The generated part of an industry insight.
///
/// Deserializes from the oracle's camelCase JSON; serializes as snake_case
/// like the rest of the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct InsightMetrics {
    pub salary_ranges: Vec<SalaryRange>,
    pub growth_rate: f64,
    pub demand_level: DemandLevel,
    pub top_skills: Vec<String>,
    pub market_outlook: MarketOutlook,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
}

impl InsightMetrics {
    /// Rejects payloads that parse but cannot be stored as-is.
    pub fn check(&self) -> Result<(), String> {
        if self.salary_ranges.is_empty() {
            return Err("salaryRanges is empty".to_string());
        }
        for range in &self.salary_ranges {
            if range.role.trim().is_empty() {
                return Err("salary range without a role".to_string());
            }
            let values = [range.min, range.max, range.median];
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(format!("salary range for '{}' has invalid amounts", range.role));
            }
            if range.min > range.max {
                return Err(format!("salary range for '{}' has min > max", range.role));
            }
        }
        if !self.growth_rate.is_finite() {
            return Err("growthRate is not a finite number".to_string());
        }
        Ok(())
    }
}

/// A persisted industry insight. At most one exists per industry name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryInsight {
    pub id: Uuid,
    pub industry: String,
    #[serde(flatten)]
    pub metrics: InsightMetrics,
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

/// An insight about to be inserted.
#[derive(Debug, Clone)]
pub struct NewIndustryInsight {
    pub id: Uuid,
    pub industry: String,
    pub metrics: InsightMetrics,
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

impl NewIndustryInsight {
    /// Stamps freshly generated metrics; `next_update` lands one week after `now`.
    pub fn new(industry: impl Into<String>, metrics: InsightMetrics, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            industry: industry.into(),
            metrics,
            last_updated: now,
            next_update: now + Duration::days(INSIGHT_REFRESH_DAYS),
        }
    }

    /// The insight as it reads back once stored.
    #[cfg(test)]
    pub fn into_insight(self) -> IndustryInsight {
        IndustryInsight {
            id: self.id,
            industry: self.industry,
            metrics: self.metrics,
            last_updated: self.last_updated,
            next_update: self.next_update,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct IndustryInsightRow {
    pub id: Uuid,
    pub industry: String,
    pub salary_ranges: Json<Vec<SalaryRange>>,
    pub growth_rate: f64,
    pub demand_level: String,
    pub top_skills: Vec<String>,
    pub market_outlook: String,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

impl TryFrom<IndustryInsightRow> for IndustryInsight {
    type Error = UnknownVariant;

    fn try_from(row: IndustryInsightRow) -> Result<Self, Self::Error> {
        Ok(IndustryInsight {
            id: row.id,
            industry: row.industry,
            metrics: InsightMetrics {
                salary_ranges: row.salary_ranges.0,
                growth_rate: row.growth_rate,
                demand_level: row.demand_level.parse()?,
                top_skills: row.top_skills,
                market_outlook: row.market_outlook.parse()?,
                key_trends: row.key_trends,
                recommended_skills: row.recommended_skills,
            },
            last_updated: row.last_updated,
            next_update: row.next_update,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_metrics() -> InsightMetrics {
    InsightMetrics {
        salary_ranges: vec![SalaryRange {
            role: "Software Engineer".to_string(),
            min: 90_000.0,
            max: 160_000.0,
            median: 120_000.0,
            location: "US".to_string(),
        }],
        growth_rate: 12.5,
        demand_level: DemandLevel::High,
        top_skills: vec!["Rust".to_string(), "SQL".to_string()],
        market_outlook: MarketOutlook::Positive,
        key_trends: vec!["AI tooling".to_string()],
        recommended_skills: vec!["Distributed systems".to_string()],
    }
}
