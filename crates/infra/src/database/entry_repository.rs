//! SQLite-backed implementation of the CalendarEntryStore port.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row, ToSql};
use taper_core::CalendarEntryStore;
use taper_domain::{
    EntryFields, MaterializedEntry, Result, TaperError,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::manager::DbManager;
use crate::errors::InfraError;

const ENTRY_COLUMNS: &str = "id, athlete_id, origin, source_id, date, discipline, title,
    duration_minutes, workout_detail, edit_state, schedule_state,
    deleted_at, deleted_by, created_at, updated_at";

/// SQLite implementation of CalendarEntryStore
pub struct SqliteCalendarEntryStore {
    db: Arc<DbManager>,
}

impl SqliteCalendarEntryStore {
    /// Create a new calendar entry store.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Flag an entry as manually edited. Called by the calendar-edit flow,
    /// not by the materializer; from then on the engine may only clear the
    /// entry's soft-delete marker.
    #[instrument(skip(self))]
    pub fn mark_manually_edited(&self, id: &str) -> Result<()> {
        self.update_state(id, "edit_state", "manually_edited")
    }

    /// Flag an entry as explicitly timed, protecting its date from
    /// re-materialization.
    #[instrument(skip(self))]
    pub fn mark_timed(&self, id: &str) -> Result<()> {
        self.update_state(id, "schedule_state", "timed")
    }

    fn update_state(&self, id: &str, column: &str, value: &str) -> Result<()> {
        let conn = self.db.get_connection()?;
        let updated = conn
            .execute(
                // column names are compile-time constants, never user input
                &format!("UPDATE calendar_entries SET {column} = ?1, updated_at = ?2 WHERE id = ?3"),
                params![value, Utc::now().timestamp(), id],
            )
            .map_err(InfraError::from)?;

        if updated == 0 {
            return Err(TaperError::NotFound(format!("entry not found: {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarEntryStore for SqliteCalendarEntryStore {
    #[instrument(skip(self, source_ids), fields(count = source_ids.len()))]
    async fn find_by_source_ids(
        &self,
        athlete_id: &str,
        origin: &str,
        source_ids: &[String],
    ) -> Result<Vec<MaterializedEntry>> {
        if source_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.db.get_connection()?;

        let placeholders =
            (3..source_ids.len() + 3).map(|n| format!("?{n}")).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT {ENTRY_COLUMNS}
             FROM calendar_entries
             WHERE athlete_id = ?1 AND origin = ?2 AND source_id IN ({placeholders})"
        );

        let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;

        let mut params: Vec<&dyn ToSql> = vec![&athlete_id, &origin];
        for source_id in source_ids {
            params.push(source_id);
        }

        let entries = stmt
            .query_map(params.as_slice(), map_entry_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        debug!(athlete_id, origin, found = entries.len(), "loaded entries by source ids");

        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn find_active_by_origin(
        &self,
        athlete_id: &str,
        origin: &str,
    ) -> Result<Vec<MaterializedEntry>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {ENTRY_COLUMNS}
                 FROM calendar_entries
                 WHERE athlete_id = ?1 AND origin = ?2 AND deleted_at IS NULL
                 ORDER BY date ASC, source_id ASC"
            ))
            .map_err(InfraError::from)?;

        let entries = stmt
            .query_map([&athlete_id as &dyn ToSql, &origin].as_ref(), map_entry_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        Ok(entries)
    }

    #[instrument(skip(self, fields))]
    async fn upsert_by_key(
        &self,
        athlete_id: &str,
        origin: &str,
        source_id: &str,
        fields: EntryFields,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;
        let now = Utc::now().timestamp();
        let id = Uuid::now_v7().to_string();

        // Upsert on the idempotency key; content updates clear any
        // soft-delete marker and leave edit/schedule state untouched.
        conn.execute(
            "INSERT INTO calendar_entries (
                id, athlete_id, origin, source_id, date, discipline, title,
                duration_minutes, workout_detail, edit_state, schedule_state,
                deleted_at, deleted_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'generated', 'planned', NULL, NULL, ?10, ?10)
            ON CONFLICT(athlete_id, origin, source_id) DO UPDATE SET
                date = excluded.date,
                discipline = excluded.discipline,
                title = excluded.title,
                duration_minutes = excluded.duration_minutes,
                workout_detail = excluded.workout_detail,
                deleted_at = NULL,
                deleted_by = NULL,
                updated_at = excluded.updated_at",
            params![
                id,
                athlete_id,
                origin,
                source_id,
                fields.date.to_string(),
                fields.discipline.to_string(),
                fields.title,
                fields.duration_minutes,
                fields.workout_detail,
                now,
            ],
        )
        .map_err(InfraError::from)?;

        debug!(athlete_id, origin, source_id, "upserted calendar entry");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn restore_by_id(&self, id: &str) -> Result<()> {
        let conn = self.db.get_connection()?;
        let updated = conn
            .execute(
                "UPDATE calendar_entries
                 SET deleted_at = NULL, deleted_by = NULL, updated_at = ?1
                 WHERE id = ?2",
                params![Utc::now().timestamp(), id],
            )
            .map_err(InfraError::from)?;

        if updated == 0 {
            return Err(TaperError::NotFound(format!("entry not found: {id}")));
        }

        debug!(id, "restored calendar entry");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn soft_delete_by_id(
        &self,
        id: &str,
        actor: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;
        let ts = timestamp.timestamp();
        let updated = conn
            .execute(
                "UPDATE calendar_entries
                 SET deleted_at = ?1, deleted_by = ?2, updated_at = ?1
                 WHERE id = ?3",
                params![ts, actor, id],
            )
            .map_err(InfraError::from)?;

        if updated == 0 {
            return Err(TaperError::NotFound(format!("entry not found: {id}")));
        }

        debug!(id, actor, "soft-deleted calendar entry");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_soft_deleted_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let conn = self.db.get_connection()?;
        let purged = conn
            .execute(
                "DELETE FROM calendar_entries
                 WHERE deleted_at IS NOT NULL AND deleted_at < ?1",
                params![cutoff.timestamp()],
            )
            .map_err(InfraError::from)?;

        debug!(purged, "purged soft-deleted calendar entries");

        Ok(purged)
    }
}

fn map_entry_row(row: &Row<'_>) -> rusqlite::Result<MaterializedEntry> {
    let date: String = row.get(4)?;
    let discipline: String = row.get(5)?;
    let edit_state: String = row.get(9)?;
    let schedule_state: String = row.get(10)?;

    Ok(MaterializedEntry {
        id: row.get(0)?,
        athlete_id: row.get(1)?,
        origin: row.get(2)?,
        source_id: row.get(3)?,
        date: parse_text(4, &date)?,
        discipline: parse_text(5, &discipline)?,
        title: row.get(6)?,
        duration_minutes: row.get(7)?,
        workout_detail: row.get(8)?,
        edit_state: parse_text(9, &edit_state)?,
        schedule_state: parse_text(10, &schedule_state)?,
        deleted_at: row.get(11)?,
        deleted_by: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn parse_text<T>(index: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, e.to_string().into())
    })
}
