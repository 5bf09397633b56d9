//! # Taper Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The plan materialization engine (normalizer, date resolver, reconciler)
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `taper-common` and `taper-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod materialization;

// Re-export specific items to avoid ambiguity
pub use materialization::dates::{start_of_week, week_offset, PlanSchedule};
pub use materialization::detail::StructuredDetailRenderer;
pub use materialization::normalizer::{
    normalize_durations, normalize_sessions, NormalizedWeek, SessionLoad,
};
pub use materialization::ports::{CalendarEntryStore, DetailRenderer, PlanProvider};
pub use materialization::MaterializationService;
