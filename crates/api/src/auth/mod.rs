//! Bearer-token authentication.
//!
//! Extracts a JWT from `Authorization: Bearer <token>`, validates it against
//! the shared HS256 secret, and exposes the caller to handlers as a
//! [`CurrentUser`] extractor. Token issuance belongs to the identity
//! provider; this service only validates what callers present.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;

use taskboard_core::Authorities;

use crate::state::AppState;

/// JWT claims payload.
///
/// `authorities` carries the granted-authority strings (`ROLE_*`,
/// `SCOPE_openid`) the role gates check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the caller's username.
    pub sub: String,
    /// Granted authorities.
    #[serde(default)]
    pub authorities: Vec<String>,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Shared JWT validation state.
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Build a validator for HS256 tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validate and decode a presented token.
    ///
    /// # Errors
    ///
    /// Returns the underlying `jsonwebtoken` error for malformed, expired,
    /// or wrongly-signed tokens.
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
    }
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator").finish_non_exhaustive()
    }
}

/// The authenticated caller, extracted from a validated bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The caller's username (the token's `sub`).
    pub username: String,
    /// The caller's granted authorities.
    pub authorities: Authorities,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            authorities: Authorities::new(claims.authorities),
        }
    }
}

impl CurrentUser {
    /// Whether the caller holds `ROLE_ADMIN`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.authorities.is_admin()
    }

    /// Whether the caller may access the given record owner's data:
    /// admins always, everyone else only their own.
    #[must_use]
    pub fn owns_or_admin(&self, created_by_user: &str) -> bool {
        self.is_admin() || self.username == created_by_user
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub enum AuthError {
    /// No `Authorization: Bearer` header was presented.
    MissingToken,
    /// The presented token failed validation.
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let msg = match self {
            Self::MissingToken => "missing authorization token".to_string(),
            Self::InvalidToken(e) => format!("invalid token: {e}"),
        };
        let body = json!({ "error": msg });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;

        let app_state = AppState::from_ref(state);
        let claims = app_state
            .jwt()
            .decode(token)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header};
    use taskboard_core::authorities;

    fn secret() -> SecretString {
        SecretString::from("kX9$mP2vQ8rT4wY7zA3bC6dE1fG5hJ0n")
    }

    fn sign(claims: &Claims, secret: &SecretString) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .expect("sign token")
    }

    fn claims_for(sub: &str, granted: &[&str]) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: sub.to_string(),
            authorities: granted.iter().map(ToString::to_string).collect(),
            iat: now,
            exp: now + 3600,
        }
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let validator = JwtValidator::new(&secret());
        let token = sign(&claims_for("dummy_user", &[authorities::TASK_CREATE]), &secret());

        let decoded = validator.decode(&token).expect("valid token");
        assert_eq!(decoded.sub, "dummy_user");
        assert_eq!(decoded.authorities, vec![authorities::TASK_CREATE]);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let validator = JwtValidator::new(&secret());
        let other = SecretString::from("zZ8#yX6!wV4@uT2$sR0%qP9^oN7&mL5*");
        let token = sign(&claims_for("user", &[]), &other);

        assert!(validator.decode(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let validator = JwtValidator::new(&secret());
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user".to_string(),
            authorities: vec![],
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = sign(&claims, &secret());

        assert!(validator.decode(&token).is_err());
    }

    #[test]
    fn test_missing_authorities_default_to_empty() {
        let validator = JwtValidator::new(&secret());
        let now = Utc::now().timestamp();
        // Hand-rolled claims without the authorities field.
        let raw = json!({ "sub": "user", "iat": now, "exp": now + 600 });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &raw,
            &EncodingKey::from_secret(secret().expose_secret().as_bytes()),
        )
        .expect("sign token");

        let decoded = validator.decode(&token).expect("valid token");
        assert!(decoded.authorities.is_empty());
    }

    #[test]
    fn test_owns_or_admin() {
        let owner: CurrentUser = claims_for("alice", &[authorities::TASK_READ]).into();
        assert!(owner.owns_or_admin("alice"));
        assert!(!owner.owns_or_admin("bob"));

        let admin: CurrentUser = claims_for("root", &[authorities::ADMIN]).into();
        assert!(admin.owns_or_admin("bob"));
    }
}
