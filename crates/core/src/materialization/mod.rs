//! Plan materialization engine
//!
//! Converts published multi-week training plans into dated calendar entries
//! and keeps them synchronized across republishes. Leaves first: the
//! duration normalizer and date resolver are pure functions; the service
//! reconciles desired state (the plan) against current state (the calendar
//! store) through the port traits.

pub mod dates;
pub mod detail;
pub mod normalizer;
pub mod ports;
pub mod service;

pub use service::MaterializationService;
