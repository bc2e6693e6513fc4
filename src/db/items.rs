use crate::errors::AppResult;
use crate::models::{EditTaskPayload, NewTaskPayload, QuestId, ReflectionItem, ReflectionKind, TaskId, TaskRecord};
use rusqlite::{params, Connection};
use std::collections::HashSet;

pub fn insert_tasks(conn: &Connection, quest: QuestId, tasks: &[NewTaskPayload]) -> AppResult<Vec<TaskRecord>> {
    let mut statement = conn.prepare("INSERT INTO tasks (status, type, text, quest_id) VALUES (?1, ?2, ?3, ?4)")?;
    let mut created = Vec::with_capacity(tasks.len());
    for task in tasks {
        statement.execute(params![task.status, task.category, task.text, quest])?;
        created.push(TaskRecord {
            id: conn.last_insert_rowid(),
            status: task.status,
            category: task.category.clone(),
            text: task.text.clone(),
            quest,
        });
    }
    Ok(created)
}

pub fn list_tasks(conn: &Connection, quest: QuestId) -> AppResult<Vec<TaskRecord>> {
    let mut statement = conn.prepare(
        "SELECT id, status, type, text, quest_id FROM tasks WHERE quest_id = ?1 ORDER BY id ASC",
    )?;
    let tasks = statement
        .query_map([quest], |row| {
            Ok(TaskRecord {
                id: row.get(0)?,
                status: row.get(1)?,
                category: row.get(2)?,
                text: row.get(3)?,
                quest: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn task_ids(conn: &Connection, quest: QuestId) -> AppResult<HashSet<TaskId>> {
    let mut statement = conn.prepare("SELECT id FROM tasks WHERE quest_id = ?1")?;
    let ids = statement
        .query_map([quest], |row| row.get(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(ids)
}

/// Updates status, and text/type when supplied, of a task owned by `quest`.
pub fn update_task(conn: &Connection, quest: QuestId, edit: &EditTaskPayload) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE tasks
         SET status = ?1, text = COALESCE(?2, text), type = COALESCE(?3, type)
         WHERE id = ?4 AND quest_id = ?5",
        params![edit.status, edit.text, edit.category, edit.id, quest],
    )?;
    Ok(changed > 0)
}

/// Full replace: every existing row of this kind for the quest is dropped first.
pub fn replace_reflections(
    conn: &Connection,
    kind: ReflectionKind,
    quest: QuestId,
    items: &[ReflectionItem],
) -> AppResult<()> {
    conn.execute(&format!("DELETE FROM {} WHERE quest_id = ?1", kind.table()), [quest])?;
    let mut statement = conn.prepare(&format!(
        "INSERT INTO {} (type, text, quest_id) VALUES (?1, ?2, ?3)",
        kind.table()
    ))?;
    for item in items {
        statement.execute(params![item.category, item.text, quest])?;
    }
    Ok(())
}

pub fn list_reflections(conn: &Connection, kind: ReflectionKind, quest: QuestId) -> AppResult<Vec<ReflectionItem>> {
    let mut statement = conn.prepare(&format!(
        "SELECT text, type FROM {} WHERE quest_id = ?1 ORDER BY id ASC",
        kind.table()
    ))?;
    let items = statement
        .query_map([quest], |row| {
            Ok(ReflectionItem {
                text: row.get(0)?,
                category: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}
