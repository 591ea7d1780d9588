//! Unified error handling for the admin panel.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::client::ClientError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Task service API call failed.
    #[error("API error: {0}")]
    Api(#[from] ClientError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from the browser (e.g., an unparseable form).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        // A rejected token means the session is stale: back to login.
        if matches!(self, Self::Api(ClientError::Unauthorized)) {
            return Redirect::to("/login?expired=1").into_response();
        }

        if matches!(self, Self::Api(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "admin request error");
        }

        let status = match &self {
            Self::Api(ClientError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::Api(ClientError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Api(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Api(ClientError::Forbidden(msg)) => msg.clone(),
            Self::Api(ClientError::NotFound) | Self::NotFound(_) => "Not found".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Api(_) | Self::Internal(_) => "Internal server error".to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_token_redirects_to_login() {
        let response = AdminError::Api(ClientError::Unauthorized).into_response();
        assert!(response.status().is_redirection());
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AdminError::NotFound("person".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_api_errors_are_redacted() {
        let err = AdminError::Api(ClientError::Api {
            status: 500,
            message: "stack trace".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
