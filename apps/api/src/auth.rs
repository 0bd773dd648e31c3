//! Caller identity.
//!
//! The auth gateway authenticates users and forwards an HS256 bearer token
//! carrying the subject id and basic profile claims. A missing or invalid
//! token means "no identity"; the flows decide whether that is `Unauthorized`.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

/// Profile details the auth provider knows about the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub primary_email: Option<String>,
}

impl IdentityProfile {
    /// "First Last", skipping whichever half is missing.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub subject: String,
    pub profile: IdentityProfile,
}

impl Identity {
    #[cfg(test)]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            profile: IdentityProfile::default(),
        }
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            subject: claims.sub,
            profile: IdentityProfile {
                first_name: claims.given_name,
                last_name: claims.family_name,
                image_url: claims.picture,
                primary_email: claims.email,
            },
        }
    }
}

/// Verifies gateway-issued bearer tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        if data.claims.sub.trim().is_empty() {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
        }
        Ok(data.claims.into())
    }
}

/// Extractor yielding the caller's identity, if any.
pub struct CurrentIdentity(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentIdentity(None));
        };
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);
        let Some(token) = token else {
            warn!("Ignoring malformed Authorization header");
            return Ok(CurrentIdentity(None));
        };

        match state.tokens.verify(token) {
            Ok(identity) => Ok(CurrentIdentity(Some(identity))),
            Err(e) => {
                warn!("Rejected bearer token: {e}");
                Ok(CurrentIdentity(None))
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn issue_token(secret: &str, subject: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: subject.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        email: Some(format!("{subject}@example.com")),
        given_name: Some("Ada".to_string()),
        family_name: Some("Lovelace".to_string()),
        picture: Some("https://img.example.com/ada.png".to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_round_trips_claims() {
        let verifier = TokenVerifier::new("secret");
        let identity = verifier.verify(&issue_token("secret", "user_2")).unwrap();
        assert_eq!(identity.subject, "user_2");
        assert_eq!(identity.profile.display_name().as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            identity.profile.primary_email.as_deref(),
            Some("user_2@example.com")
        );
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = TokenVerifier::new("secret");
        assert!(verifier.verify(&issue_token("other", "user_2")).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(TokenVerifier::new("secret").verify("not-a-jwt").is_err());
    }

    #[test]
    fn test_display_name_handles_missing_parts() {
        let profile = IdentityProfile {
            first_name: Some("Grace".to_string()),
            last_name: None,
            ..Default::default()
        };
        assert_eq!(profile.display_name().as_deref(), Some("Grace"));
        assert_eq!(IdentityProfile::default().display_name(), None);
    }
}
