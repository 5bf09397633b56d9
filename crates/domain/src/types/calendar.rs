//! Materialized calendar entry types
//!
//! These types represent the calendar side of the engine: concrete, dated
//! entries owned by the athlete's calendar and keyed back to their
//! originating plan session.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::types::plan::Discipline;

/// Who last shaped an entry's content
///
/// `ManuallyEdited` is the single explicit marker for coach/athlete edits;
/// the engine checks this state and nothing else before rewriting content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryEditState {
    Generated,
    ManuallyEdited,
}

impl_domain_status_conversions!(EntryEditState {
    Generated => "generated",
    ManuallyEdited => "manually_edited",
});

/// Whether an explicit time-of-day has been set on an entry
///
/// The engine itself never times entries (it operates on calendar dates
/// only); `Timed` is set by the calendar UI and protects the date from
/// being silently relocated on re-materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleState {
    Planned,
    Timed,
}

impl_domain_status_conversions!(ScheduleState {
    Planned => "planned",
    Timed => "timed",
});

/// A materialized calendar entry
///
/// Exactly one entry (active or soft-deleted) exists per
/// `(athlete_id, origin, source_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedEntry {
    pub id: String,
    pub athlete_id: String,
    pub origin: String,
    pub source_id: String,
    /// Calendar day-key, interpreted against the athlete's time zone
    pub date: NaiveDate,
    pub discipline: Discipline,
    pub title: String,
    pub duration_minutes: u32,
    /// Rendered workout detail text
    pub workout_detail: String,
    pub edit_state: EntryEditState,
    pub schedule_state: ScheduleState,
    /// Soft-delete timestamp (epoch seconds); `None` while active
    pub deleted_at: Option<i64>,
    pub deleted_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MaterializedEntry {
    /// Whether the entry is live on the athlete's calendar.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Single capability check gating engine rewrites: manually edited
    /// content is immutable to the engine (only `deleted_at` may be
    /// cleared).
    pub fn engine_may_rewrite(&self) -> bool {
        self.edit_state == EntryEditState::Generated
    }

    /// Whether the entry's date must be preserved on upsert. An active,
    /// explicitly timed entry keeps its date; new, soft-deleted, and
    /// still-planned entries follow the plan.
    pub fn date_is_protected(&self) -> bool {
        self.is_active() && self.schedule_state == ScheduleState::Timed
    }

    /// Soft-delete timestamp as a UTC datetime, when present.
    pub fn deleted_at_utc(&self) -> Option<DateTime<Utc>> {
        self.deleted_at.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Content fields written by an upsert
///
/// The store either inserts a new entry with these fields or overwrites the
/// matched entry's content, clearing any soft-delete marker. Edit and
/// schedule state are never written through this path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFields {
    pub date: NaiveDate,
    pub discipline: Discipline,
    pub title: String,
    pub duration_minutes: u32,
    pub workout_detail: String,
}

/// Counters reported by a materialization run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializationOutcome {
    pub upserted: usize,
    pub soft_deleted: usize,
}

/// Deterministic source id linking a materialized entry back to its
/// originating session; the idempotency key for upserts.
pub fn entry_source_id(session_id: &str) -> String {
    format!("plan-session:{session_id}")
}
