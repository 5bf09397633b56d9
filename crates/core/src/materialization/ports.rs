//! Port interfaces for plan materialization

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taper_domain::utils::workout_detail::WorkoutDetail;
use taper_domain::{EntryFields, MaterializedEntry, Result, TrainingPlan};

/// Trait for loading draft plans (desired state)
#[async_trait]
pub trait PlanProvider: Send + Sync {
    /// Fetch a plan with its sessions ordered by (week_index, day_of_week).
    /// Returns `None` when no such plan exists.
    async fn find_plan(&self, plan_id: &str) -> Result<Option<TrainingPlan>>;
}

/// Trait for validating and rendering structured session detail
///
/// Pure by contract: identical details must validate identically and render
/// to identical text. The engine treats this as an external collaborator
/// behind a seam; `StructuredDetailRenderer` is the in-repo implementation.
pub trait DetailRenderer: Send + Sync {
    /// Structurally validate a session's detail.
    fn validate(&self, detail: &WorkoutDetail) -> Result<()>;

    /// Render a session's detail to calendar entry text.
    fn render(&self, detail: &WorkoutDetail) -> String;
}

/// Trait for the calendar entry store (current state)
#[async_trait]
pub trait CalendarEntryStore: Send + Sync {
    /// Fetch entries (active and soft-deleted) matching any of the given
    /// source ids.
    async fn find_by_source_ids(
        &self,
        athlete_id: &str,
        origin: &str,
        source_ids: &[String],
    ) -> Result<Vec<MaterializedEntry>>;

    /// Fetch all active entries created by the given origin.
    async fn find_active_by_origin(
        &self,
        athlete_id: &str,
        origin: &str,
    ) -> Result<Vec<MaterializedEntry>>;

    /// Insert or update the entry keyed by `(athlete_id, origin,
    /// source_id)`, overwriting content fields and clearing any soft-delete
    /// marker. Edit and schedule state are preserved on update.
    async fn upsert_by_key(
        &self,
        athlete_id: &str,
        origin: &str,
        source_id: &str,
        fields: EntryFields,
    ) -> Result<()>;

    /// Clear the soft-delete marker on an entry without touching content.
    async fn restore_by_id(&self, id: &str) -> Result<()>;

    /// Soft-delete an entry, recording the acting principal and timestamp.
    async fn soft_delete_by_id(
        &self,
        id: &str,
        actor: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()>;

    /// Hard-delete soft-deleted entries whose deletion timestamp is older
    /// than `cutoff`. Maintenance only; never called by `materialize`.
    async fn purge_soft_deleted_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}
