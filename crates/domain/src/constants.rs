//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Materialization identity
pub const PLAN_ENGINE_ORIGIN: &str = "plan_engine";
pub const PLAN_ENGINE_ACTOR: &str = "plan_engine";

// Duration normalization
pub const SHORT_SESSION_INCREMENT_MINUTES: u32 = 5;
pub const LONG_SESSION_INCREMENT_MINUTES: u32 = 10;
pub const DEFAULT_LONG_SESSION_THRESHOLD_MINUTES: u32 = 90;

// Plan setup bounds
pub const MIN_WEEKS_TO_EVENT: u32 = 1;
pub const MAX_WEEKS_TO_EVENT: u32 = 52;

// Entry titles
pub const MAX_TITLE_LENGTH: usize = 50;
pub const TITLE_TRUNCATE_SUFFIX: &str = "...";

// Workout detail validation
pub const MAX_STEP_DURATION_MINUTES: u32 = 600;

// Materializer retry (single retry on transient storage faults)
pub const MATERIALIZE_RETRY_BACKOFF_MS: u64 = 250;
