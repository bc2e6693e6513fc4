use crate::db::{self, items, origins, quests};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::journal::JournalCore;
use crate::models::{
    CreateQuestPayload, CreatedQuest, EditQuestPayload, QuestDetail, QuestEditView, QuestId, ReflectionKind,
};
use crate::validators::{validate_new_tasks, validate_reflections, validate_task_edits, validate_theme};
use rusqlite::Connection;

impl JournalCore {
    /// Creates the quest, its initial tasks and stamps the origin as extracted, all or nothing.
    pub fn create_quest(&self, payload: CreateQuestPayload) -> AppResult<CreatedQuest> {
        tracing::debug!(origin_id = payload.origin, tasks = payload.tasks.len(), "create quest requested");

        let mut errors = validate_theme(payload.theme.as_deref());
        errors.merge(validate_new_tasks(&self.registry, &payload.tasks));
        if !errors.is_empty() {
            tracing::warn!(origin_id = payload.origin, errors = %errors, "rejected quest creation");
            return Err(AppError::Validation(errors));
        }

        let now = db::now();
        let created = self.db.with_transaction(|tx| {
            if !origins::exists(tx, payload.origin)? {
                return Err(AppError::validation(
                    "origin",
                    format!("origin {} does not exist", payload.origin),
                ));
            }
            let quest = quests::insert(tx, payload.theme.as_deref(), Some(payload.origin), now)?;
            let tasks = items::insert_tasks(tx, quest.id, &payload.tasks)?;
            origins::stamp_extracted(tx, payload.origin, now)?;
            Ok(CreatedQuest { quest, tasks })
        })?;

        tracing::info!(
            quest_id = created.quest.id,
            origin_id = payload.origin,
            tasks = created.tasks.len(),
            "quest created"
        );
        Ok(created)
    }

    /// Replaces the reflection collections, applies task statuses and derives completion.
    ///
    /// Errors, problems and knowledge are replaced wholesale: whatever the
    /// payload omits is gone afterwards. Tasks absent from the payload are
    /// left as they are and do not take part in the completion check, so a
    /// payload with no tasks at all completes the quest.
    pub fn edit_quest(&self, quest_id: QuestId, payload: EditQuestPayload) -> AppResult<QuestDetail> {
        tracing::debug!(
            quest_id,
            tasks = payload.tasks.len(),
            errors = payload.errors.len(),
            problems = payload.problems.len(),
            knowledge = payload.knowledge.len(),
            "edit quest requested"
        );

        let mut errors = validate_task_edits(&self.registry, &payload.tasks);
        for kind in ReflectionKind::ALL {
            errors.merge(validate_reflections(&self.registry, kind, reflections_of(&payload, kind)));
        }
        if !errors.is_empty() {
            tracing::warn!(quest_id, errors = %errors, "rejected quest edit");
            return Err(AppError::Validation(errors));
        }

        let now = db::now();
        let (detail, newly_completed) = self.db.with_transaction(|tx| {
            if quests::get(tx, quest_id)?.is_none() {
                return Err(AppError::NotFound(format!("quest {} not found", quest_id)));
            }

            let owned = items::task_ids(tx, quest_id)?;
            let mut ownership = FieldErrors::new();
            for (index, task) in payload.tasks.iter().enumerate() {
                if !owned.contains(&task.id) {
                    ownership.add(
                        format!("tasks[{}].id", index),
                        format!("task {} does not belong to quest {}", task.id, quest_id),
                    );
                }
            }
            ownership.into_result()?;

            for kind in ReflectionKind::ALL {
                items::replace_reflections(tx, kind, quest_id, reflections_of(&payload, kind))?;
            }

            let mut done = true;
            for task in &payload.tasks {
                if task.status == 0 {
                    done = false;
                }
                items::update_task(tx, quest_id, task)?;
            }

            let newly_completed = done && quests::mark_completed(tx, quest_id, now)?;
            quests::set_last_update(tx, quest_id, now)?;

            Ok((load_detail(tx, quest_id)?, newly_completed))
        })?;

        tracing::info!(
            quest_id,
            tasks = payload.tasks.len(),
            errors = detail.errors.len(),
            problems = detail.problems.len(),
            knowledge = detail.knowledge.len(),
            completed = newly_completed,
            "quest edited"
        );
        Ok(detail)
    }

    pub fn quest_detail(&self, quest_id: QuestId) -> AppResult<QuestDetail> {
        self.db.with_connection(|conn| load_detail(conn, quest_id))
    }

    /// Edit-form data: current collections plus every allowed category.
    pub fn quest_for_edit(&self, quest_id: QuestId) -> AppResult<QuestEditView> {
        let detail = self.quest_detail(quest_id)?;
        Ok(QuestEditView {
            tasks: detail.tasks,
            errors: detail.errors,
            problems: detail.problems,
            knowledge: detail.knowledge,
            types: self.registry.snapshot(),
        })
    }

    pub fn delete_quest(&self, quest_id: QuestId) -> AppResult<()> {
        let deleted = self.db.with_connection(|conn| quests::delete(conn, quest_id))?;
        if !deleted {
            return Err(AppError::NotFound(format!("quest {} not found", quest_id)));
        }
        tracing::info!(quest_id, "quest deleted");
        Ok(())
    }
}

fn reflections_of(payload: &EditQuestPayload, kind: ReflectionKind) -> &[crate::models::ReflectionItem] {
    match kind {
        ReflectionKind::Error => &payload.errors,
        ReflectionKind::Problem => &payload.problems,
        ReflectionKind::Knowledge => &payload.knowledge,
    }
}

fn load_detail(conn: &Connection, quest_id: QuestId) -> AppResult<QuestDetail> {
    let quest = quests::get(conn, quest_id)?
        .ok_or_else(|| AppError::NotFound(format!("quest {} not found", quest_id)))?;
    Ok(QuestDetail {
        tasks: items::list_tasks(conn, quest_id)?,
        errors: items::list_reflections(conn, ReflectionKind::Error, quest_id)?,
        problems: items::list_reflections(conn, ReflectionKind::Problem, quest_id)?,
        knowledge: items::list_reflections(conn, ReflectionKind::Knowledge, quest_id)?,
        quest,
    })
}
