//! Mock repository implementations for testing
//!
//! Provides in-memory mocks for the materialization ports, enabling
//! deterministic reconciler tests without database dependencies. The entry
//! store supports transient-fault injection for retry-path tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taper_core::{CalendarEntryStore, PlanProvider};
use taper_domain::{
    EntryEditState, EntryFields, MaterializedEntry, Result as DomainResult, ScheduleState,
    TaperError, TrainingPlan,
};

/// In-memory mock for `PlanProvider`.
#[derive(Default)]
pub struct InMemoryPlanProvider {
    plans: Mutex<HashMap<String, TrainingPlan>>,
}

impl InMemoryPlanProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a plan.
    pub fn put_plan(&self, plan: TrainingPlan) {
        self.plans.lock().unwrap().insert(plan.id.clone(), plan);
    }
}

#[async_trait]
impl PlanProvider for InMemoryPlanProvider {
    async fn find_plan(&self, plan_id: &str) -> DomainResult<Option<TrainingPlan>> {
        let mut plan = self.plans.lock().unwrap().get(plan_id).cloned();
        if let Some(ref mut plan) = plan {
            plan.sessions.sort_by_key(|s| (s.week_index, s.day_of_week, s.id.clone()));
        }
        Ok(plan)
    }
}

/// In-memory mock for `CalendarEntryStore`.
///
/// Entries live in a map keyed by entry id; `fail_next_calls` makes the
/// next N store calls fail with a transient storage error, for retry
/// tests.
#[derive(Default)]
pub struct InMemoryEntryStore {
    entries: Mutex<HashMap<String, MaterializedEntry>>,
    next_id: AtomicU32,
    fail_next: AtomicU32,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` store calls fail with `TransientStorage`.
    pub fn fail_next_calls(&self, count: u32) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Snapshot of all entries, ordered by source id for stable assertions.
    pub fn entries(&self) -> Vec<MaterializedEntry> {
        let mut all: Vec<_> = self.entries.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        all
    }

    /// Fetch the single entry for a source id, if any.
    pub fn entry_by_source(&self, source_id: &str) -> Option<MaterializedEntry> {
        self.entries
            .lock()
            .unwrap()
            .values()
            .find(|entry| entry.source_id == source_id)
            .cloned()
    }

    /// Simulate a coach editing an entry by hand in the calendar UI.
    pub fn mark_manually_edited(&self, source_id: &str) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.values_mut().find(|e| e.source_id == source_id) {
            entry.edit_state = EntryEditState::ManuallyEdited;
        }
    }

    /// Simulate the athlete setting an explicit time on an entry.
    pub fn mark_timed(&self, source_id: &str) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.values_mut().find(|e| e.source_id == source_id) {
            entry.schedule_state = ScheduleState::Timed;
        }
    }

    fn check_fault(&self) -> DomainResult<()> {
        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(TaperError::TransientStorage("injected storage fault".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarEntryStore for InMemoryEntryStore {
    async fn find_by_source_ids(
        &self,
        athlete_id: &str,
        origin: &str,
        source_ids: &[String],
    ) -> DomainResult<Vec<MaterializedEntry>> {
        self.check_fault()?;
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|entry| {
                entry.athlete_id == athlete_id
                    && entry.origin == origin
                    && source_ids.contains(&entry.source_id)
            })
            .cloned()
            .collect())
    }

    async fn find_active_by_origin(
        &self,
        athlete_id: &str,
        origin: &str,
    ) -> DomainResult<Vec<MaterializedEntry>> {
        self.check_fault()?;
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|entry| {
                entry.athlete_id == athlete_id
                    && entry.origin == origin
                    && entry.deleted_at.is_none()
            })
            .cloned()
            .collect())
    }

    async fn upsert_by_key(
        &self,
        athlete_id: &str,
        origin: &str,
        source_id: &str,
        fields: EntryFields,
    ) -> DomainResult<()> {
        self.check_fault()?;
        let mut entries = self.entries.lock().unwrap();
        let now = Utc::now().timestamp();

        if let Some(entry) = entries.values_mut().find(|e| {
            e.athlete_id == athlete_id && e.origin == origin && e.source_id == source_id
        }) {
            entry.date = fields.date;
            entry.discipline = fields.discipline;
            entry.title = fields.title;
            entry.duration_minutes = fields.duration_minutes;
            entry.workout_detail = fields.workout_detail;
            entry.deleted_at = None;
            entry.deleted_by = None;
            entry.updated_at = now;
            return Ok(());
        }

        let id = format!("entry-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        entries.insert(
            id.clone(),
            MaterializedEntry {
                id,
                athlete_id: athlete_id.to_string(),
                origin: origin.to_string(),
                source_id: source_id.to_string(),
                date: fields.date,
                discipline: fields.discipline,
                title: fields.title,
                duration_minutes: fields.duration_minutes,
                workout_detail: fields.workout_detail,
                edit_state: EntryEditState::Generated,
                schedule_state: ScheduleState::Planned,
                deleted_at: None,
                deleted_by: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn restore_by_id(&self, id: &str) -> DomainResult<()> {
        self.check_fault()?;
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| TaperError::NotFound(format!("entry not found: {id}")))?;
        entry.deleted_at = None;
        entry.deleted_by = None;
        entry.updated_at = Utc::now().timestamp();
        Ok(())
    }

    async fn soft_delete_by_id(
        &self,
        id: &str,
        actor: &str,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.check_fault()?;
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| TaperError::NotFound(format!("entry not found: {id}")))?;
        entry.deleted_at = Some(timestamp.timestamp());
        entry.deleted_by = Some(actor.to_string());
        entry.updated_at = timestamp.timestamp();
        Ok(())
    }

    async fn purge_soft_deleted_older_than(&self, cutoff: DateTime<Utc>) -> DomainResult<usize> {
        self.check_fault()?;
        let mut entries = self.entries.lock().unwrap();
        let cutoff_ts = cutoff.timestamp();
        let before = entries.len();
        entries.retain(|_, entry| match entry.deleted_at {
            Some(deleted_at) => deleted_at >= cutoff_ts,
            None => true,
        });
        Ok(before - entries.len())
    }
}
