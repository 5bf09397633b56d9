//! Full-stack materialization test: core service over the SQLite adapters.

use std::sync::Arc;

use chrono::NaiveDate;
use taper_core::{CalendarEntryStore, MaterializationService};
use taper_domain::utils::workout_detail::{StepPhase, WorkoutDetail, WorkoutStep};
use taper_domain::{
    entry_source_id, Discipline, DraftSession, PlanSetup, PlanStatus, TaperError, TrainingPlan,
    WeekStart,
};
use taper_infra::{DbManager, SqliteCalendarEntryStore, SqlitePlanRepository};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn session(id: &str, week_index: u32, day_of_week: u8, duration: u32) -> DraftSession {
    DraftSession {
        id: id.to_string(),
        week_index,
        day_of_week,
        discipline: Discipline::Run,
        session_type: "Steady".to_string(),
        duration_minutes: duration,
        locked: false,
        detail: WorkoutDetail {
            focus: None,
            steps: vec![WorkoutStep {
                phase: StepPhase::Main,
                description: "steady running".to_string(),
                duration_minutes: Some(duration),
            }],
        },
        notes: None,
    }
}

fn plan(sessions: Vec<DraftSession>) -> TrainingPlan {
    TrainingPlan {
        id: "plan-1".to_string(),
        athlete_id: "ath-1".to_string(),
        status: PlanStatus::Published,
        setup: PlanSetup {
            week_start: WeekStart::Monday,
            start_date: Some(date(2026, 3, 2)),
            completion_date: None,
            weeks_to_event: 8,
            time_zone: "Europe/London".to_string(),
        },
        sessions,
    }
}

struct Stack {
    plans: Arc<SqlitePlanRepository>,
    entries: Arc<SqliteCalendarEntryStore>,
    service: MaterializationService,
    _temp: TempDir,
}

fn stack() -> Stack {
    let temp = TempDir::new().unwrap();
    let db = Arc::new(DbManager::new(temp.path().join("taper.db"), 4).unwrap());
    db.run_migrations().unwrap();

    let plans = Arc::new(SqlitePlanRepository::new(db.clone()));
    let entries = Arc::new(SqliteCalendarEntryStore::new(db));
    let service = MaterializationService::new(plans.clone(), entries.clone());

    Stack { plans, entries, service, _temp: temp }
}

#[tokio::test]
async fn publish_edit_republish_lifecycle() {
    let stack = stack();

    stack
        .plans
        .save_plan(&plan(vec![session("s1", 0, 1, 45), session("s2", 0, 3, 60)]))
        .unwrap();

    // First publish creates dated entries
    let outcome = stack.service.materialize("plan-1").await.unwrap();
    assert_eq!(outcome.upserted, 2);
    assert_eq!(outcome.soft_deleted, 0);

    let sources = vec![entry_source_id("s1"), entry_source_id("s2")];
    let entries =
        stack.entries.find_by_source_ids("ath-1", "plan_engine", &sources).await.unwrap();
    assert_eq!(entries.len(), 2);

    let monday = entries.iter().find(|e| e.source_id == sources[0]).unwrap();
    assert_eq!(monday.date, date(2026, 3, 2));
    assert_eq!(monday.title, "Run: Steady");

    // Coach hand-edits the Monday entry, then republishes with changes
    stack.entries.mark_manually_edited(&monday.id).unwrap();

    stack
        .plans
        .save_plan(&plan(vec![session("s1", 0, 1, 90), session("s3", 1, 1, 30)]))
        .unwrap();

    let outcome = stack.service.materialize("plan-1").await.unwrap();
    // s3 written; s1 untouched (manually edited, active)
    assert_eq!(outcome.upserted, 1);
    // s2 left the plan
    assert_eq!(outcome.soft_deleted, 1);

    let sources = vec![entry_source_id("s1"), entry_source_id("s2"), entry_source_id("s3")];
    let entries =
        stack.entries.find_by_source_ids("ath-1", "plan_engine", &sources).await.unwrap();

    let edited = entries.iter().find(|e| e.source_id == sources[0]).unwrap();
    assert_eq!(edited.duration_minutes, 45, "manual edit must survive republish");

    let removed = entries.iter().find(|e| e.source_id == sources[1]).unwrap();
    assert!(removed.deleted_at.is_some());
    assert_eq!(removed.deleted_by.as_deref(), Some("plan_engine"));

    let added = entries.iter().find(|e| e.source_id == sources[2]).unwrap();
    assert_eq!(added.date, date(2026, 3, 9));

    // Re-running the unchanged plan is a no-op on the soft-delete side
    let outcome = stack.service.materialize("plan-1").await.unwrap();
    assert_eq!(outcome.soft_deleted, 0);
}

#[tokio::test]
async fn unpublished_plan_is_rejected_without_writes() {
    let stack = stack();

    let mut draft = plan(vec![session("s1", 0, 1, 45)]);
    draft.status = PlanStatus::Draft;
    stack.plans.save_plan(&draft).unwrap();

    let err = stack.service.materialize("plan-1").await.unwrap_err();
    assert!(matches!(err, TaperError::Conflict(_)));

    let active =
        stack.entries.find_active_by_origin("ath-1", "plan_engine").await.unwrap();
    assert!(active.is_empty());
}
