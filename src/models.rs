use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type OriginId = i64;
pub type QuestId = i64;
pub type TaskId = i64;
pub type DayId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginStatus {
    #[default]
    Actual,
    Frozen,
}

impl OriginStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Actual => "actual",
            Self::Frozen => "frozen",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginRecord {
    pub id: OriginId,
    pub created_at: DateTime<Utc>,
    pub last_extracted_at: Option<DateTime<Utc>>,
    pub name: String,
    pub status: OriginStatus,
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveOriginPayload {
    pub name: String,
    #[serde(default)]
    pub status: OriginStatus,
    #[serde(default)]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestRecord {
    pub id: QuestId,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_update: Option<DateTime<Utc>>,
    pub theme: Option<String>,
    pub origin: Option<OriginId>,
}

impl QuestRecord {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Task status: zero is "not done", anything else is "done".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub status: i16,
    #[serde(rename = "type")]
    pub category: String,
    pub text: String,
    pub quest: QuestId,
}

impl TaskRecord {
    pub fn is_done(&self) -> bool {
        self.status != 0
    }
}

/// The three reflection collections attached to a quest share one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReflectionKind {
    Error,
    Problem,
    Knowledge,
}

impl ReflectionKind {
    pub const ALL: [ReflectionKind; 3] = [Self::Error, Self::Problem, Self::Knowledge];

    pub fn table(self) -> &'static str {
        match self {
            Self::Error => "errors",
            Self::Problem => "problems",
            Self::Knowledge => "knowledge",
        }
    }

    pub fn category_kind(self) -> CategoryKind {
        match self {
            Self::Error => CategoryKind::Errors,
            Self::Problem => CategoryKind::Problems,
            Self::Knowledge => CategoryKind::Knowledge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Tasks,
    Errors,
    Problems,
    Knowledge,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 4] = [Self::Tasks, Self::Errors, Self::Problems, Self::Knowledge];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Errors => "errors",
            Self::Problems => "problems",
            Self::Knowledge => "knowledge",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionItem {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "type", default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub id: DayId,
    pub date: NaiveDate,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTaskPayload {
    pub text: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub status: i16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestPayload {
    #[serde(default)]
    pub theme: Option<String>,
    pub origin: OriginId,
    #[serde(default)]
    pub tasks: Vec<NewTaskPayload>,
}

/// Text and type are optional on edit; when absent the stored values stay.
#[derive(Debug, Clone, Deserialize)]
pub struct EditTaskPayload {
    pub id: TaskId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "type", default)]
    pub category: Option<String>,
    pub status: i16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditQuestPayload {
    #[serde(default)]
    pub tasks: Vec<EditTaskPayload>,
    #[serde(default)]
    pub errors: Vec<ReflectionItem>,
    #[serde(default)]
    pub problems: Vec<ReflectionItem>,
    #[serde(default)]
    pub knowledge: Vec<ReflectionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedQuest {
    pub quest: QuestRecord,
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestDetail {
    pub quest: QuestRecord,
    pub tasks: Vec<TaskRecord>,
    pub errors: Vec<ReflectionItem>,
    pub problems: Vec<ReflectionItem>,
    pub knowledge: Vec<ReflectionItem>,
}

/// Edit-form payload: the quest's collections plus every allowed category.
#[derive(Debug, Clone, Serialize)]
pub struct QuestEditView {
    pub tasks: Vec<TaskRecord>,
    pub errors: Vec<ReflectionItem>,
    pub problems: Vec<ReflectionItem>,
    pub knowledge: Vec<ReflectionItem>,
    pub types: BTreeMap<CategoryKind, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestSummary {
    pub id: QuestId,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_update: Option<DateTime<Utc>>,
    pub theme: Option<String>,
    pub origin: Option<OriginId>,
    pub origin_name: Option<String>,
    pub tasks_total: i64,
    pub tasks_done: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayShift {
    #[default]
    Stay,
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestDayPage {
    pub date: NaiveDate,
    pub day: DayRecord,
    pub quests: Vec<QuestSummary>,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDayPayload {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestFormView {
    pub origin: OriginRecord,
    pub types: BTreeMap<CategoryKind, BTreeMap<String, String>>,
}
