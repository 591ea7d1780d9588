//! Integration tests for Taskboard.
//!
//! # Running Tests
//!
//! ```bash
//! # With PostgreSQL running, apply migrations and seed sample data
//! cargo run -p taskboard-cli -- migrate
//! cargo run -p taskboard-cli -- seed --clear
//!
//! # Start the API server
//! cargo run -p taskboard-api
//!
//! # Run integration tests
//! cargo test -p taskboard-integration-tests -- --ignored
//! ```
//!
//! Tests mint their own bearer tokens with the same HS256 secret the server
//! validates with (`JWT_SECRET`), so no identity provider is needed.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// The HS256 secret tokens are signed with.
///
/// Must match the running server's `JWT_SECRET`.
#[must_use]
pub fn jwt_secret() -> String {
    std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "v8Kq2mXw9rLp4nJh7cFd1bGt5yHs3aZe".to_string())
}

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    authorities: &'a [&'a str],
    iat: i64,
    exp: i64,
}

/// Mint a bearer token for `username` carrying the given authorities.
///
/// # Panics
///
/// Panics if signing fails (never happens with a valid HS256 secret).
#[must_use]
pub fn mint_token(username: &str, granted: &[&str]) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: username,
        authorities: granted,
        iat: now,
        exp: now + 3600,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// Build an HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}
