use super::{format_time, parse_optional_time, parse_time};
use crate::errors::AppResult;
use crate::models::{OriginId, OriginRecord, OriginStatus, SaveOriginPayload};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

const ORIGIN_COLUMNS: &str = "id, created_at, last_extracted_at, name, status, origin";

// Unset timestamps sort first under SQLite's ascending order.
const DEFAULT_ORDER: &str = "ORDER BY last_extracted_at ASC, created_at ASC, id ASC";

pub fn insert(conn: &Connection, payload: &SaveOriginPayload, now: DateTime<Utc>) -> AppResult<OriginRecord> {
    conn.execute(
        "INSERT INTO origins (created_at, last_extracted_at, name, status, origin) VALUES (?1, NULL, ?2, ?3, ?4)",
        params![format_time(now), payload.name, payload.status.as_str(), payload.origin],
    )?;
    Ok(OriginRecord {
        id: conn.last_insert_rowid(),
        created_at: now,
        last_extracted_at: None,
        name: payload.name.clone(),
        status: payload.status,
        origin: payload.origin.clone(),
    })
}

pub fn get(conn: &Connection, id: OriginId) -> AppResult<Option<OriginRecord>> {
    let origin = conn
        .query_row(
            &format!("SELECT {} FROM origins WHERE id = ?1", ORIGIN_COLUMNS),
            [id],
            parse_origin_row,
        )
        .optional()?;
    Ok(origin)
}

pub fn exists(conn: &Connection, id: OriginId) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM origins WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

pub fn list(conn: &Connection) -> AppResult<Vec<OriginRecord>> {
    let mut statement = conn.prepare(&format!("SELECT {} FROM origins {}", ORIGIN_COLUMNS, DEFAULT_ORDER))?;
    let origins = statement
        .query_map([], parse_origin_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(origins)
}

/// Returns `false` when no origin has this id.
pub fn update(conn: &Connection, id: OriginId, payload: &SaveOriginPayload) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE origins SET name = ?1, status = ?2, origin = ?3 WHERE id = ?4",
        params![payload.name, payload.status.as_str(), payload.origin, id],
    )?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: OriginId) -> AppResult<bool> {
    let changed = conn.execute("DELETE FROM origins WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

pub fn stamp_extracted(conn: &Connection, id: OriginId, now: DateTime<Utc>) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE origins SET last_extracted_at = ?1 WHERE id = ?2",
        params![format_time(now), id],
    )?;
    Ok(changed > 0)
}

/// Oldest actual origin that has never been extracted.
pub fn first_unstarted_actual(conn: &Connection) -> AppResult<Option<OriginRecord>> {
    let origin = conn
        .query_row(
            &format!(
                "SELECT {} FROM origins
                 WHERE status = ?1 AND last_extracted_at IS NULL
                 ORDER BY created_at ASC, id ASC LIMIT 1",
                ORIGIN_COLUMNS
            ),
            [OriginStatus::Actual.as_str()],
            parse_origin_row,
        )
        .optional()?;
    Ok(origin)
}

/// First actual origin in default order, i.e. the least recently extracted one.
pub fn first_actual(conn: &Connection) -> AppResult<Option<OriginRecord>> {
    let origin = conn
        .query_row(
            &format!(
                "SELECT {} FROM origins WHERE status = ?1 {} LIMIT 1",
                ORIGIN_COLUMNS, DEFAULT_ORDER
            ),
            [OriginStatus::Actual.as_str()],
            parse_origin_row,
        )
        .optional()?;
    Ok(origin)
}

fn parse_origin_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OriginRecord> {
    Ok(OriginRecord {
        id: row.get(0)?,
        created_at: parse_time(&row.get::<_, String>(1)?)?,
        last_extracted_at: parse_optional_time(row.get(2)?)?,
        name: row.get(3)?,
        status: parse_status(&row.get::<_, String>(4)?)?,
        origin: row.get(5)?,
    })
}

fn parse_status(raw: &str) -> rusqlite::Result<OriginStatus> {
    match raw {
        "actual" => Ok(OriginStatus::Actual),
        "frozen" => Ok(OriginStatus::Frozen),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Unknown origin status '{}'", other),
            )),
        )),
    }
}
