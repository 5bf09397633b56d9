//! Materialization service - core business logic
//!
//! Reconciles a published plan (desired state) against the calendar store
//! (current state): idempotent upserts keyed by source id, soft-deletes for
//! sessions that left the plan, and a single retry on transient storage
//! faults. Manual edits are never overwritten; explicitly timed entries
//! keep their date.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use taper_common::RetryPolicy;
use taper_domain::constants::{
    MATERIALIZE_RETRY_BACKOFF_MS, PLAN_ENGINE_ACTOR, PLAN_ENGINE_ORIGIN,
};
use taper_domain::utils::title::build_entry_title;
use taper_domain::{
    entry_source_id, DraftSession, EntryFields, MaterializationOutcome, MaterializedEntry,
    PlanStatus, Result, TaperError, TrainingPlan,
};
use tracing::{debug, info, instrument};

use super::dates::PlanSchedule;
use super::detail::StructuredDetailRenderer;
use super::ports::{CalendarEntryStore, DetailRenderer, PlanProvider};

/// Plan materialization service
pub struct MaterializationService {
    plans: Arc<dyn PlanProvider>,
    entries: Arc<dyn CalendarEntryStore>,
    renderer: Arc<dyn DetailRenderer>,
    retry: RetryPolicy,
}

impl MaterializationService {
    /// Create a new materialization service with the default structural
    /// detail renderer and the standard retry-once policy.
    pub fn new(plans: Arc<dyn PlanProvider>, entries: Arc<dyn CalendarEntryStore>) -> Self {
        Self {
            plans,
            entries,
            renderer: Arc::new(StructuredDetailRenderer),
            retry: RetryPolicy::once_after(Duration::from_millis(MATERIALIZE_RETRY_BACKOFF_MS)),
        }
    }

    /// Swap in a different detail renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn DetailRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Override the retry policy. Tests use this to drop the backoff delay.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Materialize a published plan into calendar entries.
    ///
    /// Idempotent: the upsert key is the session's stable source id and the
    /// soft-delete set is recomputed from scratch, so repeated or
    /// interleaved runs converge on the same calendar state. The whole
    /// operation is retried exactly once on a transient storage fault.
    #[instrument(skip(self), fields(plan_id))]
    pub async fn materialize(&self, plan_id: &str) -> Result<MaterializationOutcome> {
        self.retry.run(TaperError::is_transient, || self.materialize_once(plan_id)).await
    }

    async fn materialize_once(&self, plan_id: &str) -> Result<MaterializationOutcome> {
        let plan = self
            .plans
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| TaperError::NotFound(format!("plan not found: {plan_id}")))?;

        if plan.status != PlanStatus::Published {
            return Err(TaperError::Conflict(format!(
                "plan {plan_id} is not published (status: {})",
                plan.status
            )));
        }

        let schedule = PlanSchedule::from_setup(&plan.setup)?;

        // All-or-nothing validation pass: nothing is written unless every
        // session's detail is structurally valid.
        self.validate_sessions(&plan)?;

        let desired_ids: Vec<String> =
            plan.sessions.iter().map(|session| entry_source_id(&session.id)).collect();

        let existing = self
            .entries
            .find_by_source_ids(&plan.athlete_id, PLAN_ENGINE_ORIGIN, &desired_ids)
            .await?;
        let existing_by_source: HashMap<&str, &MaterializedEntry> =
            existing.iter().map(|entry| (entry.source_id.as_str(), entry)).collect();

        let mut upserted = 0usize;
        for (session, source_id) in plan.sessions.iter().zip(&desired_ids) {
            let current = existing_by_source.get(source_id.as_str()).copied();
            if self.apply_session(&plan, &schedule, session, source_id, current).await? {
                upserted += 1;
            }
        }

        // Soft-delete pass, recomputed from scratch on every run: any
        // active entry of ours no longer backed by a session goes away.
        let desired: HashSet<&str> = desired_ids.iter().map(String::as_str).collect();
        let active =
            self.entries.find_active_by_origin(&plan.athlete_id, PLAN_ENGINE_ORIGIN).await?;

        let mut soft_deleted = 0usize;
        for entry in &active {
            if desired.contains(entry.source_id.as_str()) {
                continue;
            }
            self.entries.soft_delete_by_id(&entry.id, PLAN_ENGINE_ACTOR, Utc::now()).await?;
            debug!(entry_id = %entry.id, source_id = %entry.source_id, "soft-deleted orphaned entry");
            soft_deleted += 1;
        }

        info!(plan_id, upserted, soft_deleted, "plan materialization completed");

        Ok(MaterializationOutcome { upserted, soft_deleted })
    }

    fn validate_sessions(&self, plan: &TrainingPlan) -> Result<()> {
        for session in &plan.sessions {
            self.renderer.validate(&session.detail).map_err(|error| match error {
                TaperError::Validation(message) => {
                    TaperError::Validation(format!("session {}: {message}", session.id))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Reconcile one session against its existing entry, if any. Returns
    /// whether a write happened.
    async fn apply_session(
        &self,
        plan: &TrainingPlan,
        schedule: &PlanSchedule,
        session: &DraftSession,
        source_id: &str,
        current: Option<&MaterializedEntry>,
    ) -> Result<bool> {
        let resolved_date = schedule.resolve(session.week_index, session.day_of_week)?;

        if let Some(entry) = current {
            if !entry.engine_may_rewrite() {
                // Manual edits are immutable to the engine; the only
                // permitted transition is clearing a soft-delete marker.
                if entry.is_active() {
                    debug!(entry_id = %entry.id, "skipping manually edited entry");
                    return Ok(false);
                }
                self.entries.restore_by_id(&entry.id).await?;
                debug!(entry_id = %entry.id, "restored manually edited entry");
                return Ok(true);
            }
        }

        // An active entry the athlete has explicitly timed keeps its date;
        // new, soft-deleted, and still-planned entries follow the plan.
        let date = match current {
            Some(entry) if entry.date_is_protected() => entry.date,
            _ => resolved_date,
        };

        let fields = EntryFields {
            date,
            discipline: session.discipline,
            title: build_entry_title(session.discipline, &session.session_type),
            duration_minutes: session.duration_minutes,
            workout_detail: self.renderer.render(&session.detail),
        };

        self.entries
            .upsert_by_key(&plan.athlete_id, PLAN_ENGINE_ORIGIN, source_id, fields)
            .await?;

        Ok(true)
    }

    /// Hard-delete soft-deleted entries older than the given number of
    /// days. Maintenance operation; separate from `materialize`.
    #[instrument(skip(self))]
    pub async fn purge_soft_deleted(&self, older_than_days: i64) -> Result<usize> {
        let cutoff = Utc::now() - chrono::Duration::days(older_than_days);
        let purged = self.entries.purge_soft_deleted_older_than(cutoff).await?;
        info!(older_than_days, purged, "purged soft-deleted entries");
        Ok(purged)
    }
}
