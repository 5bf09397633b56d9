//! SQLite-backed implementation of the PlanProvider port.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Row, ToSql};
use taper_core::PlanProvider;
use taper_domain::utils::workout_detail::WorkoutDetail;
use taper_domain::{
    Discipline, DraftSession, PlanSetup, PlanStatus, Result, TrainingPlan, WeekStart,
};
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of PlanProvider
pub struct SqlitePlanRepository {
    db: Arc<DbManager>,
}

impl SqlitePlanRepository {
    /// Create a new plan repository.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a plan and its sessions.
    ///
    /// Sessions are replaced wholesale; the plan is the source of truth for
    /// its own session set.
    #[instrument(skip(self, plan), fields(plan_id = %plan.id))]
    pub fn save_plan(&self, plan: &TrainingPlan) -> Result<()> {
        let conn = self.db.get_connection()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO training_plans (
                id, athlete_id, status, week_start, start_date, completion_date,
                weeks_to_event, time_zone, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ON CONFLICT(id) DO UPDATE SET
                athlete_id = excluded.athlete_id,
                status = excluded.status,
                week_start = excluded.week_start,
                start_date = excluded.start_date,
                completion_date = excluded.completion_date,
                weeks_to_event = excluded.weeks_to_event,
                time_zone = excluded.time_zone,
                updated_at = excluded.updated_at",
            params![
                plan.id,
                plan.athlete_id,
                plan.status.to_string(),
                plan.setup.week_start.to_string(),
                plan.setup.start_date.map(|d| d.to_string()),
                plan.setup.completion_date.map(|d| d.to_string()),
                plan.setup.weeks_to_event,
                plan.setup.time_zone,
                now,
            ],
        )
        .map_err(InfraError::from)?;

        conn.execute("DELETE FROM plan_sessions WHERE plan_id = ?1", params![plan.id])
            .map_err(InfraError::from)?;

        for session in &plan.sessions {
            let detail_json = serde_json::to_string(&session.detail)
                .map_err(|e| taper_domain::TaperError::Internal(format!(
                    "failed to serialize workout detail: {e}"
                )))?;

            conn.execute(
                "INSERT INTO plan_sessions (
                    id, plan_id, week_index, day_of_week, discipline, session_type,
                    duration_minutes, locked, detail_json, notes, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    session.id,
                    plan.id,
                    session.week_index,
                    session.day_of_week,
                    session.discipline.to_string(),
                    session.session_type,
                    session.duration_minutes,
                    session.locked,
                    detail_json,
                    session.notes,
                    now,
                ],
            )
            .map_err(InfraError::from)?;
        }

        debug!(sessions = plan.sessions.len(), "saved plan");

        Ok(())
    }
}

#[async_trait]
impl PlanProvider for SqlitePlanRepository {
    #[instrument(skip(self))]
    async fn find_plan(&self, plan_id: &str) -> Result<Option<TrainingPlan>> {
        let conn = self.db.get_connection()?;

        let plan = conn.query_row(
            "SELECT id, athlete_id, status, week_start, start_date, completion_date,
                    weeks_to_event, time_zone
             FROM training_plans
             WHERE id = ?1",
            params![plan_id],
            map_plan_row,
        );

        let mut plan = match plan {
            Ok(plan) => plan,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(InfraError::from(e).into()),
        };

        let mut stmt = conn
            .prepare(
                "SELECT id, week_index, day_of_week, discipline, session_type,
                        duration_minutes, locked, detail_json, notes
                 FROM plan_sessions
                 WHERE plan_id = ?1
                 ORDER BY week_index ASC, day_of_week ASC, id ASC",
            )
            .map_err(InfraError::from)?;

        let sessions = stmt
            .query_map([&plan_id as &dyn ToSql], map_session_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<DraftSession>>>()
            .map_err(InfraError::from)?;

        plan.sessions = sessions;

        debug!(plan_id, sessions = plan.sessions.len(), "loaded plan");

        Ok(Some(plan))
    }
}

fn map_plan_row(row: &Row<'_>) -> rusqlite::Result<TrainingPlan> {
    let status: String = row.get(2)?;
    let week_start: String = row.get(3)?;
    let start_date: Option<String> = row.get(4)?;
    let completion_date: Option<String> = row.get(5)?;

    Ok(TrainingPlan {
        id: row.get(0)?,
        athlete_id: row.get(1)?,
        status: parse_text::<PlanStatus>(2, &status)?,
        setup: PlanSetup {
            week_start: parse_text::<WeekStart>(3, &week_start)?,
            start_date: start_date.as_deref().map(|d| parse_text(4, d)).transpose()?,
            completion_date: completion_date.as_deref().map(|d| parse_text(5, d)).transpose()?,
            weeks_to_event: row.get(6)?,
            time_zone: row.get(7)?,
        },
        sessions: Vec::new(),
    })
}

fn map_session_row(row: &Row<'_>) -> rusqlite::Result<DraftSession> {
    let discipline: String = row.get(3)?;
    let detail_json: String = row.get(7)?;

    let detail: WorkoutDetail = serde_json::from_str(&detail_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
    })?;

    Ok(DraftSession {
        id: row.get(0)?,
        week_index: row.get(1)?,
        day_of_week: row.get(2)?,
        discipline: parse_text::<Discipline>(3, &discipline)?,
        session_type: row.get(4)?,
        duration_minutes: row.get(5)?,
        locked: row.get(6)?,
        detail,
        notes: row.get(8)?,
    })
}

/// Parse a TEXT column through FromStr, mapping failures onto the column.
fn parse_text<T>(index: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, e.to_string().into())
    })
}
