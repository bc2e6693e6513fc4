use super::{format_date, format_time, parse_optional_time, parse_time};
use crate::errors::AppResult;
use crate::models::{OriginId, QuestId, QuestRecord, QuestSummary};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

const QUEST_COLUMNS: &str = "id, created_at, completed_at, last_update, theme, origin_id";

pub fn insert(
    conn: &Connection,
    theme: Option<&str>,
    origin: Option<OriginId>,
    now: DateTime<Utc>,
) -> AppResult<QuestRecord> {
    conn.execute(
        "INSERT INTO quests (created_at, completed_at, last_update, theme, origin_id) VALUES (?1, NULL, NULL, ?2, ?3)",
        params![format_time(now), theme, origin],
    )?;
    Ok(QuestRecord {
        id: conn.last_insert_rowid(),
        created_at: now,
        completed_at: None,
        last_update: None,
        theme: theme.map(ToString::to_string),
        origin,
    })
}

pub fn get(conn: &Connection, id: QuestId) -> AppResult<Option<QuestRecord>> {
    let quest = conn
        .query_row(
            &format!("SELECT {} FROM quests WHERE id = ?1", QUEST_COLUMNS),
            [id],
            parse_quest_row,
        )
        .optional()?;
    Ok(quest)
}

/// Quests in default order: unfinished first, then by creation time.
pub fn list(conn: &Connection) -> AppResult<Vec<QuestRecord>> {
    let mut statement = conn.prepare(&format!(
        "SELECT {} FROM quests ORDER BY completed_at ASC, created_at ASC, id ASC",
        QUEST_COLUMNS
    ))?;
    let quests = statement
        .query_map([], parse_quest_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quests)
}

/// Owned tasks, errors, problems and knowledge go with the quest.
pub fn delete(conn: &Connection, id: QuestId) -> AppResult<bool> {
    let changed = conn.execute("DELETE FROM quests WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

pub fn set_last_update(conn: &Connection, id: QuestId, now: DateTime<Utc>) -> AppResult<()> {
    conn.execute(
        "UPDATE quests SET last_update = ?1 WHERE id = ?2",
        params![format_time(now), id],
    )?;
    Ok(())
}

/// Sets `completed_at` only if it is still unset; returns whether it changed.
pub fn mark_completed(conn: &Connection, id: QuestId, now: DateTime<Utc>) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE quests SET completed_at = ?1 WHERE id = ?2 AND completed_at IS NULL",
        params![format_time(now), id],
    )?;
    Ok(changed > 0)
}

pub fn list_created_on(conn: &Connection, date: NaiveDate) -> AppResult<Vec<QuestSummary>> {
    let mut statement = conn.prepare(
        "SELECT q.id, q.created_at, q.completed_at, q.last_update, q.theme, q.origin_id, o.name,
                (SELECT COUNT(*) FROM tasks t WHERE t.quest_id = q.id),
                (SELECT COUNT(*) FROM tasks t WHERE t.quest_id = q.id AND t.status != 0)
         FROM quests q
         LEFT JOIN origins o ON o.id = q.origin_id
         WHERE substr(q.created_at, 1, 10) = ?1
         ORDER BY q.created_at ASC, q.id ASC",
    )?;
    let quests = statement
        .query_map([format_date(date)], |row| {
            Ok(QuestSummary {
                id: row.get(0)?,
                created_at: parse_time(&row.get::<_, String>(1)?)?,
                completed_at: parse_optional_time(row.get(2)?)?,
                last_update: parse_optional_time(row.get(3)?)?,
                theme: row.get(4)?,
                origin: row.get(5)?,
                origin_name: row.get(6)?,
                tasks_total: row.get(7)?,
                tasks_done: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quests)
}

pub fn exists_created_before(conn: &Connection, date: NaiveDate) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM quests WHERE substr(created_at, 1, 10) < ?1 LIMIT 1",
            [format_date(date)],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn exists_created_after(conn: &Connection, date: NaiveDate) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM quests WHERE substr(created_at, 1, 10) > ?1 LIMIT 1",
            [format_date(date)],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn parse_quest_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuestRecord> {
    Ok(QuestRecord {
        id: row.get(0)?,
        created_at: parse_time(&row.get::<_, String>(1)?)?,
        completed_at: parse_optional_time(row.get(2)?)?,
        last_update: parse_optional_time(row.get(3)?)?,
        theme: row.get(4)?,
        origin: row.get(5)?,
    })
}
