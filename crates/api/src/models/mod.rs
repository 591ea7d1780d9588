//! Domain types for the task service.

pub mod person;
pub mod task;

pub use person::{Address, Child, ChildPayload, Person, PersonPayload};
pub use task::{Task, TaskPayload};
