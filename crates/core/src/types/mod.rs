//! Core types for Taskboard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod authority;
pub mod id;
pub mod page;

pub use authority::{Authorities, authorities};
pub use id::*;
pub use page::{Page, PageRequest, SortDirection};
