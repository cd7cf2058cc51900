//! Records exchanged with the TickTick Open API.
//!
//! # Design
//! Inbound records (`Task`, `Project`, `Column`, `ChecklistItem`,
//! `ProjectData`) have no optional fields. The service leaves out keys whose
//! value is empty, so a missing key decodes to the field's zero value.
//!
//! Request records mix required plain fields with `Option<T>` fields. A
//! `None` field is left out of the JSON body; a `Some` field is always sent,
//! zero values included. See [`crate::opt`] for the constructors.

use serde::{Deserialize, Serialize};

use crate::time::Time;

/// Task priority values.
pub mod priority {
    pub const NONE: i32 = 0;
    pub const LOW: i32 = 1;
    pub const MEDIUM: i32 = 3;
    pub const HIGH: i32 = 5;
}

/// `Task::status` values.
pub mod task_status {
    pub const NORMAL: i32 = 0;
    pub const COMPLETED: i32 = 2;
}

/// `ChecklistItem::status` values.
pub mod checklist_status {
    pub const NORMAL: i32 = 0;
    pub const COMPLETED: i32 = 1;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub is_all_day: bool,
    pub completed_time: Time,
    pub content: String,
    pub desc: String,
    pub due_date: Time,
    pub items: Vec<ChecklistItem>,
    pub priority: i32,
    /// iCalendar `TRIGGER` strings, e.g. `TRIGGER:-PT30M`.
    pub reminders: Vec<String>,
    /// iCalendar `RRULE` string, passed through untouched.
    pub repeat_flag: String,
    pub sort_order: i64,
    pub start_date: Time,
    pub status: i32,
    pub time_zone: String,
    pub kind: String,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == task_status::COMPLETED
    }
}

/// A subtask within a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChecklistItem {
    pub id: String,
    pub title: String,
    pub status: i32,
    pub completed_time: Time,
    pub is_all_day: bool,
    pub sort_order: i64,
    pub start_date: Time,
    pub time_zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: String,
    pub sort_order: i64,
    pub closed: bool,
    pub group_id: String,
    pub view_mode: String,
    pub permission: String,
    pub kind: String,
}

/// A kanban column within a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Column {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub sort_order: i64,
}

/// A project together with its open tasks and its columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectData {
    pub project: Project,
    pub tasks: Vec<Task>,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Time>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Time>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CreateChecklistItemRequest>>,
}

impl CreateTaskRequest {
    pub fn new(title: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            project_id: project_id.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a task. `id` and `project_id` are always sent; every
/// other field is only touched on the server when it is `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub id: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Time>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Time>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CreateChecklistItemRequest>>,
}

impl UpdateTaskRequest {
    pub fn new(id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            ..Self::default()
        }
    }
}

/// A subtask inside a task create or update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChecklistItemRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Time>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<Time>,
}

impl CreateChecklistItemRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    /// `list`, `kanban` or `timeline`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<String>,
    /// `TASK` or `NOTE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl CreateProjectRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}
