//! Modular common utilities shared across Taper crates.
//!
//! This crate sits below the domain layer: nothing in here knows about
//! training plans or calendars. It currently provides the resilience
//! primitives used by the materialization engine.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;

pub use resilience::{RetryError, RetryPolicy};
