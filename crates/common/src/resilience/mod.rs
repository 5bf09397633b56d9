//! Resilience primitives for fallible operations.
//!
//! The materialization engine retries transient storage faults at
//! whole-operation granularity; the policy here is intentionally small:
//! a fixed attempt count, a fixed backoff, and a caller-supplied predicate
//! deciding which errors are worth a second try.

mod retry;

pub use retry::{RetryError, RetryPolicy};
