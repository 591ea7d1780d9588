//! HTTP route handlers for the task service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Tasks
//! GET    /api/tasks            - Task page (page/size/sort-dir/sort-idx/search)
//! POST   /api/tasks            - Create task (or update, when a body id is present)
//! GET    /api/tasks/{id}       - Task by id
//! PUT    /api/tasks/{id}       - Update task
//! DELETE /api/tasks/{id}       - Delete task
//!
//! # People
//! GET    /api/people           - Person page (page/pageSize/search)
//! POST   /api/people           - Create person
//! GET    /api/people/{id}      - Person by id
//! PUT    /api/people/{id}      - Update person
//! DELETE /api/people/{id}      - Delete person
//! ```
//!
//! Every handler applies the same two-step rule: a role gate (admin, a
//! matching `ROLE_*`, or `SCOPE_openid`), then a per-record ownership check
//! that only `ROLE_ADMIN` bypasses.

pub mod people;
pub mod tasks;

use axum::{Router, routing::get};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(tasks::find_all).post(tasks::create))
        .route(
            "/api/tasks/{id}",
            get(tasks::find_by_id)
                .put(tasks::update)
                .delete(tasks::delete),
        )
        .route("/api/people", get(people::find_all).post(people::create))
        .route(
            "/api/people/{id}",
            get(people::find_by_id)
                .put(people::update)
                .delete(people::delete),
        )
}

/// Role gate applied before any handler logic: admin, any of `roles`, or
/// the `SCOPE_openid` bypass.
pub(crate) fn require_any_role(user: &CurrentUser, roles: &[&str]) -> Result<(), AppError> {
    if user.authorities.any_role_or_openid(roles) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User({}) does not have any of the required authorities",
            user.username
        )))
    }
}

/// Ownership gate applied to single-record operations.
pub(crate) fn require_owner_or_admin(
    user: &CurrentUser,
    created_by_user: &str,
) -> Result<(), AppError> {
    if user.owns_or_admin(created_by_user) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User({}) does not have access to this resource",
            user.username
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use taskboard_core::authorities;

    fn user_with(granted: &[&str]) -> CurrentUser {
        Claims {
            sub: "alice".to_string(),
            authorities: granted.iter().map(ToString::to_string).collect(),
            iat: 0,
            exp: 0,
        }
        .into()
    }

    #[test]
    fn test_role_gate_rejects_unrelated_authority() {
        let user = user_with(&[authorities::TASK_DELETE]);
        assert!(require_any_role(&user, &[authorities::TASK_READ]).is_err());
        assert!(require_any_role(&user, &[authorities::TASK_DELETE]).is_ok());
    }

    #[test]
    fn test_openid_scope_passes_role_gate() {
        let user = user_with(&[authorities::SCOPE_OPENID]);
        assert!(require_any_role(&user, &[authorities::PERSON_READ]).is_ok());
    }

    #[test]
    fn test_ownership_gate() {
        let user = user_with(&[authorities::TASK_READ]);
        assert!(require_owner_or_admin(&user, "alice").is_ok());
        assert!(require_owner_or_admin(&user, "bob").is_err());

        let admin = user_with(&[authorities::ADMIN]);
        assert!(require_owner_or_admin(&admin, "bob").is_ok());
    }
}
