//! Draft training plan types
//!
//! A plan addresses sessions by (week_index, day_of_week); nothing on this
//! side of the model carries an absolute date. Dates only exist after
//! materialization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LONG_SESSION_THRESHOLD_MINUTES;
use crate::impl_domain_status_conversions;
use crate::utils::workout_detail::WorkoutDetail;

/// First day of the training week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    Sunday,
}

impl_domain_status_conversions!(WeekStart {
    Monday => "monday",
    Sunday => "sunday",
});

/// Training plan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Draft,
    Published,
    Archived,
}

impl_domain_status_conversions!(PlanStatus {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

/// Sport discipline of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Swim,
    Bike,
    Run,
    Strength,
    Mobility,
    Rest,
}

impl_domain_status_conversions!(Discipline {
    Swim => "swim",
    Bike => "bike",
    Run => "run",
    Strength => "strength",
    Mobility => "mobility",
    Rest => "rest",
});

impl Discipline {
    /// Human-facing label used in entry titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Swim => "Swim",
            Self::Bike => "Bike",
            Self::Run => "Run",
            Self::Strength => "Strength",
            Self::Mobility => "Mobility",
            Self::Rest => "Rest",
        }
    }
}

/// Plan-level scheduling setup
///
/// Either `start_date` is present (start-anchored plans) or
/// `completion_date` is (legacy completion-anchored plans). `time_zone` is
/// an IANA identifier kept as a string here; parsing and validation happen
/// when a plan is materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSetup {
    pub week_start: WeekStart,
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub weeks_to_event: u32,
    pub time_zone: String,
}

/// A single authored session within a draft plan
///
/// `day_of_week` uses the raw 0-6 encoding of the authoring tools,
/// 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSession {
    pub id: String,
    pub week_index: u32,
    pub day_of_week: u8,
    pub discipline: Discipline,
    pub session_type: String,
    pub duration_minutes: u32,
    pub locked: bool,
    pub detail: WorkoutDetail,
    pub notes: Option<String>,
}

/// A draft plan together with its sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub id: String,
    pub athlete_id: String,
    pub status: PlanStatus,
    pub setup: PlanSetup,
    /// Ordered by (week_index, day_of_week)
    pub sessions: Vec<DraftSession>,
}

/// Plan-level rules for duration normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationRules {
    /// Day of week (raw 0-6 encoding) whose sessions are always "long",
    /// if the plan designates one
    pub long_session_day: Option<u8>,
    /// Raw duration at or above which a session counts as "long"
    pub long_session_threshold_minutes: u32,
}

impl Default for NormalizationRules {
    fn default() -> Self {
        Self {
            long_session_day: None,
            long_session_threshold_minutes: DEFAULT_LONG_SESSION_THRESHOLD_MINUTES,
        }
    }
}
