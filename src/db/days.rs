use super::{format_date, parse_date};
use crate::errors::AppResult;
use crate::models::{DayId, DayRecord};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

/// At most one day row exists per date; the first lookup creates it empty.
pub fn get_or_create(conn: &Connection, date: NaiveDate) -> AppResult<DayRecord> {
    let raw_date = format_date(date);
    conn.execute(
        "INSERT OR IGNORE INTO days (date, content) VALUES (?1, '')",
        [&raw_date],
    )?;
    let day = conn.query_row(
        "SELECT id, date, content FROM days WHERE date = ?1",
        [&raw_date],
        parse_day_row,
    )?;
    Ok(day)
}

pub fn get(conn: &Connection, id: DayId) -> AppResult<Option<DayRecord>> {
    let day = conn
        .query_row("SELECT id, date, content FROM days WHERE id = ?1", [id], parse_day_row)
        .optional()?;
    Ok(day)
}

pub fn update_content(conn: &Connection, id: DayId, content: &str) -> AppResult<bool> {
    let changed = conn.execute("UPDATE days SET content = ?1 WHERE id = ?2", params![content, id])?;
    Ok(changed > 0)
}

fn parse_day_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DayRecord> {
    Ok(DayRecord {
        id: row.get(0)?,
        date: parse_date(&row.get::<_, String>(1)?)?,
        content: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    #[test]
    fn one_day_row_per_date() {
        let (_dir, db) = test_database();
        db.with_connection(|conn| {
            let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
            let first = get_or_create(conn, date)?;
            assert_eq!(first.content, "");
            assert!(update_content(conn, first.id, "notes")?);

            let second = get_or_create(conn, date)?;
            assert_eq!(second.id, first.id);
            assert_eq!(second.content, "notes");
            assert_eq!(get(conn, first.id)?.map(|day| day.date), Some(date));
            assert!(!update_content(conn, first.id + 100, "nope")?);
            Ok(())
        })
        .expect("days");
    }
}
