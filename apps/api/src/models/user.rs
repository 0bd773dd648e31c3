use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A platform user, keyed by the auth provider's subject id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub auth_subject: String,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub industry: Option<String>,
    pub experience: Option<i32>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Onboarding is complete once an industry has been chosen.
    pub fn is_onboarded(&self) -> bool {
        self.onboarded_industry().is_some()
    }

    /// The chosen industry, if it is set and non-blank.
    pub fn onboarded_industry(&self) -> Option<&str> {
        self.industry
            .as_deref()
            .map(str::trim)
            .filter(|industry| !industry.is_empty())
    }
}

/// Fields captured from the auth provider when a user is first seen.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub auth_subject: String,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

/// Validated onboarding payload written by the profile update flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub industry: String,
    pub experience: i32,
    pub bio: Option<String>,
    pub skills: Vec<String>,
}
