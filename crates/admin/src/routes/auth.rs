//! Login and logout route handlers.
//!
//! The panel does not issue tokens. An operator pastes a bearer token from
//! the identity provider; the panel reads its claims, probes the task
//! service to confirm the token is accepted, and stores both in the session.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::client::ClientError;
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

use tower_sessions::Session;

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Login page query parameters.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Set when a stale session was bounced back to login.
    #[serde(default)]
    pub expired: Option<u8>,
}

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub token: String,
}

/// `GET /login`
#[instrument(skip_all)]
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let error = query
        .expired
        .map(|_| "401 - Unauthorized - please login again".to_string());
    render_login(LoginTemplate { error })
}

/// `POST /login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match CurrentUser::from_token(&form.token) {
        Ok(user) => user,
        Err(e) => {
            return render_login(LoginTemplate {
                error: Some(e.to_string()),
            })
            .into_response();
        }
    };

    // Confirm the task service accepts the token before creating a session.
    if let Err(e) = state.client().probe(&user.token).await {
        let message = match e {
            ClientError::Unauthorized => "token rejected by the task service".to_string(),
            ClientError::Forbidden(_) => {
                "token accepted, but it grants no person authorities".to_string()
            }
            other => {
                tracing::error!(error = %other, "login probe failed");
                "could not reach the task service".to_string()
            }
        };
        return render_login(LoginTemplate {
            error: Some(message),
        })
        .into_response();
    }

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!(error = %e, "failed to store session");
        return render_login(LoginTemplate {
            error: Some("failed to create session".to_string()),
        })
        .into_response();
    }

    tracing::info!(username = %user.username, "admin login");
    Redirect::to("/people").into_response()
}

/// `POST /logout`
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "failed to clear session");
    }
    Redirect::to("/login")
}

fn render_login(template: LoginTemplate) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}
