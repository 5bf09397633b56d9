//! Shared test support for core integration tests

pub mod repositories;

pub use repositories::{InMemoryEntryStore, InMemoryPlanProvider};
