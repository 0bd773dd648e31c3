//! Onboarding form rules. The UI validates the same form, but the server
//! never trusts that it did.

use serde::{Deserialize, Serialize};

use crate::models::user::ProfileUpdate;

pub const MAX_EXPERIENCE_YEARS: i64 = 50;
pub const MAX_BIO_CHARS: usize = 500;

/// Experience arrives either as a JSON number or as the raw text of a number input.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExperienceInput {
    Years(i64),
    /// Any other JSON number, e.g. `3.0`; must still be whole.
    Number(f64),
    Text(String),
}

/// Onboarding form as submitted by the UI.
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingForm {
    #[serde(default)]
    pub industry: String,
    #[serde(default, alias = "subIndustry")]
    pub sub_industry: String,
    pub experience: Option<ExperienceInput>,
    /// Comma-separated.
    pub skills: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validates the form and produces the profile update, collecting every field error.
pub fn validate_onboarding(form: &OnboardingForm) -> Result<ProfileUpdate, Vec<FieldError>> {
    let mut errors = Vec::new();

    let industry = form.industry.trim();
    if industry.is_empty() {
        errors.push(FieldError::new("industry", "Please select an industry"));
    }

    let sub_industry = form.sub_industry.trim();
    if sub_industry.is_empty() {
        errors.push(FieldError::new("sub_industry", "Please select a specialization"));
    }

    let experience = match parse_experience(form.experience.as_ref()) {
        Ok(years) => Some(years),
        Err(message) => {
            errors.push(FieldError::new("experience", message));
            None
        }
    };

    let bio = form
        .bio
        .as_deref()
        .map(str::trim)
        .filter(|bio| !bio.is_empty());
    if bio.is_some_and(|bio| bio.chars().count() > MAX_BIO_CHARS) {
        errors.push(FieldError::new(
            "bio",
            format!("Bio cannot exceed {MAX_BIO_CHARS} characters"),
        ));
    }

    match experience {
        Some(experience) if errors.is_empty() => Ok(ProfileUpdate {
            industry: compose_industry(industry, sub_industry),
            experience,
            bio: bio.map(String::from),
            skills: parse_skills(form.skills.as_deref().unwrap_or_default()),
        }),
        _ => Err(errors),
    }
}

/// Joins the industry id and specialization into the stored industry key,
/// e.g. `tech` + `Software Development` → `tech-software-development`.
pub fn compose_industry(industry: &str, sub_industry: &str) -> String {
    let sub = sub_industry.trim().to_lowercase().replace(' ', "-");
    format!("{}-{}", industry.trim(), sub)
}

/// Splits comma-separated skills, trimming each and dropping empties.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(String::from)
        .collect()
}

fn parse_experience(input: Option<&ExperienceInput>) -> Result<i32, String> {
    let years = match input {
        None => return Err("Experience is required".to_string()),
        Some(ExperienceInput::Years(years)) => *years,
        Some(ExperienceInput::Number(n)) if n.is_finite() && n.fract() == 0.0 => *n as i64,
        Some(ExperienceInput::Number(_)) => {
            return Err("Experience must be a whole number of years".to_string())
        }
        Some(ExperienceInput::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| "Experience must be a whole number of years".to_string())?,
    };
    if years < 0 {
        return Err("Experience must be at least 0 years".to_string());
    }
    if years > MAX_EXPERIENCE_YEARS {
        return Err(format!(
            "Experience cannot exceed {MAX_EXPERIENCE_YEARS} years"
        ));
    }
    Ok(years as i32)
}
