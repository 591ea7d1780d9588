//! Domain types for the admin panel.

pub mod session;

pub use session::{CurrentUser, TokenError, session_keys};
