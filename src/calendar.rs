use crate::db::{self, days, quests};
use crate::errors::{AppError, AppResult};
use crate::journal::JournalCore;
use crate::models::{DayId, DayRecord, DayShift, QuestDayPage};
use chrono::{Days, NaiveDate};

impl JournalCore {
    /// One calendar day of quests, today (UTC) unless a date is given.
    ///
    /// The shift is applied before anything is read, so `Previous` on D
    /// renders D - 1. The day's annotation row is created on first view.
    pub fn quest_day_page(&self, date: Option<NaiveDate>, shift: DayShift) -> AppResult<QuestDayPage> {
        let date = shift_date(date.unwrap_or_else(|| db::now().date_naive()), shift)?;
        self.db.with_transaction(|tx| {
            Ok(QuestDayPage {
                date,
                day: days::get_or_create(tx, date)?,
                quests: quests::list_created_on(tx, date)?,
                has_previous: quests::exists_created_before(tx, date)?,
                has_next: quests::exists_created_after(tx, date)?,
            })
        })
    }

    pub fn update_day_content(&self, day_id: DayId, content: &str) -> AppResult<DayRecord> {
        let day = self.db.with_transaction(|tx| {
            if !days::update_content(tx, day_id, content)? {
                return Err(AppError::NotFound(format!("day {} not found", day_id)));
            }
            days::get(tx, day_id)?.ok_or_else(|| AppError::NotFound(format!("day {} not found", day_id)))
        })?;
        tracing::info!(day_id, date = %day.date, "day content updated");
        Ok(day)
    }
}

pub fn shift_date(date: NaiveDate, shift: DayShift) -> AppResult<NaiveDate> {
    let shifted = match shift {
        DayShift::Stay => Some(date),
        DayShift::Previous => date.checked_sub_days(Days::new(1)),
        DayShift::Next => date.checked_add_days(Days::new(1)),
    };
    shifted.ok_or_else(|| AppError::validation("date", format!("cannot move past {}", date)))
}
