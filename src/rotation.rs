use crate::db::{self, origins, quests};
use crate::errors::{AppError, AppResult};
use crate::journal::JournalCore;
use crate::models::{CreatedQuest, OriginId, OriginRecord, QuestFormView, SaveOriginPayload};
use crate::validators::validate_origin;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

impl JournalCore {
    /// Next origin to play, without side effects.
    ///
    /// The oldest never-extracted actual origin wins; otherwise the least
    /// recently extracted actual origin. Frozen origins are never picked.
    pub fn select_next_origin(&self) -> AppResult<Option<OriginRecord>> {
        self.db.with_connection(pick_next_origin)
    }

    /// Picks the next origin and stamps `last_extracted_at`, whether or not a quest follows.
    pub fn reserve_next_origin(&self) -> AppResult<Option<OriginRecord>> {
        let now = db::now();
        let reserved = self.db.with_transaction(|tx| {
            let Some(mut origin) = pick_next_origin(tx)? else {
                return Ok(None);
            };
            origins::stamp_extracted(tx, origin.id, now)?;
            origin.last_extracted_at = Some(now);
            Ok(Some(origin))
        })?;

        match &reserved {
            Some(origin) => tracing::info!(origin_id = origin.id, name = %origin.name, "origin reserved"),
            None => tracing::info!("no actual origin available"),
        }
        Ok(reserved)
    }

    /// Create-form data; `None` means there is nothing to play and the user should manage origins.
    pub fn quest_form(&self) -> AppResult<Option<QuestFormView>> {
        Ok(self.reserve_next_origin()?.map(|origin| QuestFormView {
            origin,
            types: self.registry.snapshot(),
        }))
    }

    /// Starts an empty quest from a chosen origin, frozen ones included.
    pub fn start_quest_from_origin(&self, origin_id: OriginId) -> AppResult<CreatedQuest> {
        let now = db::now();
        let quest = self.db.with_transaction(|tx| {
            if !origins::stamp_extracted(tx, origin_id, now)? {
                return Err(AppError::NotFound(format!("origin {} not found", origin_id)));
            }
            quests::insert(tx, None, Some(origin_id), now)
        })?;
        tracing::info!(quest_id = quest.id, origin_id, "quest started from origin");
        Ok(CreatedQuest { quest, tasks: Vec::new() })
    }

    pub fn list_origins(&self) -> AppResult<Vec<OriginRecord>> {
        self.db.with_connection(origins::list)
    }

    pub fn get_origin(&self, origin_id: OriginId) -> AppResult<OriginRecord> {
        self.db
            .with_connection(|conn| origins::get(conn, origin_id))?
            .ok_or_else(|| AppError::NotFound(format!("origin {} not found", origin_id)))
    }

    pub fn create_origin(&self, payload: SaveOriginPayload) -> AppResult<OriginRecord> {
        self.create_origin_at(payload, db::now())
    }

    pub(crate) fn create_origin_at(&self, payload: SaveOriginPayload, now: DateTime<Utc>) -> AppResult<OriginRecord> {
        validate_origin(&payload).into_result()?;
        let origin = self.db.with_connection(|conn| origins::insert(conn, &payload, now))?;
        tracing::info!(origin_id = origin.id, name = %origin.name, status = origin.status.as_str(), "origin created");
        Ok(origin)
    }

    pub fn update_origin(&self, origin_id: OriginId, payload: SaveOriginPayload) -> AppResult<OriginRecord> {
        validate_origin(&payload).into_result()?;
        let origin = self.db.with_transaction(|tx| {
            if !origins::update(tx, origin_id, &payload)? {
                return Err(AppError::NotFound(format!("origin {} not found", origin_id)));
            }
            origins::get(tx, origin_id)?
                .ok_or_else(|| AppError::NotFound(format!("origin {} not found", origin_id)))
        })?;
        tracing::info!(origin_id, status = origin.status.as_str(), "origin updated");
        Ok(origin)
    }

    /// Dependent quests survive with their origin reference cleared.
    pub fn delete_origin(&self, origin_id: OriginId) -> AppResult<()> {
        if !self.db.with_connection(|conn| origins::delete(conn, origin_id))? {
            return Err(AppError::NotFound(format!("origin {} not found", origin_id)));
        }
        tracing::info!(origin_id, "origin deleted");
        Ok(())
    }
}

fn pick_next_origin(conn: &Connection) -> AppResult<Option<OriginRecord>> {
    if let Some(origin) = origins::first_unstarted_actual(conn)? {
        return Ok(Some(origin));
    }
    origins::first_actual(conn)
}
