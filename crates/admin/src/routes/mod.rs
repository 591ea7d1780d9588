//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Auth (session wraps a pasted bearer token)
//! GET  /login                  - Login page
//! POST /login                  - Validate token, create session
//! POST /logout                 - Logout
//!
//! # People
//! GET  /                       - Redirect to /people
//! GET  /people                 - Person listing (page/search)
//! GET  /people/new             - Create form
//! POST /people                 - Submit create
//! GET  /people/{id}            - Edit form
//! POST /people/{id}            - Submit update
//! POST /people/{id}/delete     - Delete person
//! ```

pub mod auth;
pub mod people;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the panel router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/people") }))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/people", get(people::index).post(people::create))
        .route("/people/new", get(people::new_form))
        .route("/people/{id}", get(people::edit_form).post(people::update))
        .route("/people/{id}/delete", post(people::delete))
}
