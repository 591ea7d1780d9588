//! Session-related types for admin authentication.
//!
//! The panel does not hold the token-signing secret; it reads the claims of
//! a pasted token without verifying the signature, for display and for
//! enabling/disabling UI affordances only. Every actual operation forwards
//! the raw token to the task service, which is the enforcement point.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use taskboard_core::Authorities;

/// Claims carried by a task service bearer token.
#[derive(Debug, Clone, Deserialize)]
struct TokenClaims {
    sub: String,
    #[serde(default)]
    authorities: Vec<String>,
    #[allow(dead_code)]
    exp: i64,
}

/// Error reading a pasted token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is not a valid JWT: {0}")]
    Malformed(String),
}

/// Session-stored identity.
///
/// Holds the raw bearer token so API calls can forward it, plus the claims
/// the UI renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The caller's username (the token's `sub`).
    pub username: String,
    /// Granted authorities, for UI affordances.
    pub authorities: Authorities,
    /// The raw bearer token forwarded on API calls.
    pub token: String,
}

impl CurrentUser {
    /// Read a pasted bearer token into a session identity.
    ///
    /// The signature is NOT verified here (the panel has no secret);
    /// expiry is still checked so an obviously dead token is rejected at
    /// the door.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if the token cannot be decoded or
    /// is already expired.
    pub fn from_token(token: &str) -> Result<Self, TokenError> {
        let token = token.trim().trim_start_matches("Bearer ").trim();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();

        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
                .map_err(|e| TokenError::Malformed(e.to_string()))?;

        Ok(Self {
            username: data.claims.sub,
            authorities: Authorities::new(data.claims.authorities),
            token: token.to_string(),
        })
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
