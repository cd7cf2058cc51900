//! In-memory stand-in for the TickTick Open API.
//!
//! Only the routes the client uses are served. Every route requires
//! `Authorization: Bearer <token>` with the token passed to [`app`]. Dates
//! are stored as raw JSON so whatever the client sends is echoed back
//! unchanged; completing a task stamps `completedTime` as an epoch-millisecond
//! integer, like some of the real endpoints do.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
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

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub sort_order: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub title: String,
    pub status: i32,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub completed_time: Value,
    pub is_all_day: bool,
    pub sort_order: i64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub start_date: Value,
    pub time_zone: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub completed_time: Value,
    pub content: String,
    pub desc: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub due_date: Value,
    pub items: Vec<ChecklistItem>,
    pub priority: i32,
    pub reminders: Vec<String>,
    pub repeat_flag: String,
    pub sort_order: i64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub start_date: Value,
    pub status: i32,
    pub time_zone: String,
    pub kind: String,
}

#[derive(Serialize)]
pub struct ProjectData {
    pub project: Project,
    pub tasks: Vec<Task>,
    pub columns: Vec<Column>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
    pub view_mode: Option<String>,
    pub kind: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
    pub view_mode: Option<String>,
    pub kind: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemInput {
    pub title: String,
    pub start_date: Option<Value>,
    pub is_all_day: Option<bool>,
    pub sort_order: Option<i64>,
    pub time_zone: Option<String>,
    pub status: Option<i32>,
    pub completed_time: Option<Value>,
}

/// Task fields shared by create and update bodies.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    pub content: Option<String>,
    pub desc: Option<String>,
    pub is_all_day: Option<bool>,
    pub start_date: Option<Value>,
    pub due_date: Option<Value>,
    pub time_zone: Option<String>,
    pub reminders: Option<Vec<String>>,
    pub repeat_flag: Option<String>,
    pub priority: Option<i32>,
    pub sort_order: Option<i64>,
    pub items: Option<Vec<ChecklistItemInput>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    pub project_id: String,
    #[serde(flatten)]
    pub fields: TaskFields,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub id: String,
    pub project_id: String,
    pub title: Option<String>,
    #[serde(flatten)]
    pub fields: TaskFields,
}

pub const TASK_STATUS_COMPLETED: i32 = 2;

#[derive(Default)]
pub struct Store {
    projects: HashMap<String, Project>,
    columns: HashMap<String, Vec<Column>>,
    tasks: HashMap<String, Task>,
}

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    store: Arc<RwLock<Store>>,
}

type Failure = (StatusCode, &'static str);

const PROJECT_NOT_FOUND: Failure = (StatusCode::NOT_FOUND, "project not found");
const TASK_NOT_FOUND: Failure = (StatusCode::NOT_FOUND, "task not found");

pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/open/v1/project", get(list_projects).post(create_project))
        .route(
            "/open/v1/project/{project_id}",
            get(get_project).post(update_project).delete(delete_project),
        )
        .route("/open/v1/project/{project_id}/data", get(get_project_data))
        .route(
            "/open/v1/project/{project_id}/task/{task_id}",
            get(get_task).delete(delete_task),
        )
        .route(
            "/open/v1/project/{project_id}/task/{task_id}/complete",
            post(complete_task),
        )
        .route("/open/v1/task", post(create_task))
        .route("/open/v1/task/{task_id}", post(update_task))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.token);
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if presented != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    }
    next.run(request).await
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// --- projects ---

async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    let store = state.store.read().await;
    let mut projects: Vec<Project> = store.projects.values().cloned().collect();
    projects.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
    Json(projects)
}

async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> Json<Project> {
    let project = Project {
        id: new_id(),
        name: input.name,
        color: input.color.unwrap_or_default(),
        sort_order: input.sort_order.unwrap_or_default(),
        closed: false,
        group_id: String::new(),
        view_mode: input.view_mode.unwrap_or_else(|| "list".to_string()),
        permission: "write".to_string(),
        kind: input.kind.unwrap_or_else(|| "TASK".to_string()),
    };
    let mut store = state.store.write().await;
    if project.view_mode == "kanban" {
        let column = Column {
            id: new_id(),
            project_id: project.id.clone(),
            name: "To Do".to_string(),
            sort_order: 0,
        };
        store.columns.insert(project.id.clone(), vec![column]);
    }
    store.projects.insert(project.id.clone(), project.clone());
    debug!(id = %project.id, "project created");
    Json(project)
}

async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, Failure> {
    let store = state.store.read().await;
    store
        .projects
        .get(&project_id)
        .cloned()
        .map(Json)
        .ok_or(PROJECT_NOT_FOUND)
}

async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(input): Json<UpdateProject>,
) -> Result<Json<Project>, Failure> {
    let mut store = state.store.write().await;
    let project = store.projects.get_mut(&project_id).ok_or(PROJECT_NOT_FOUND)?;
    if let Some(name) = input.name {
        project.name = name;
    }
    if let Some(color) = input.color {
        project.color = color;
    }
    if let Some(sort_order) = input.sort_order {
        project.sort_order = sort_order;
    }
    if let Some(view_mode) = input.view_mode {
        project.view_mode = view_mode;
    }
    if let Some(kind) = input.kind {
        project.kind = kind;
    }
    Ok(Json(project.clone()))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, Failure> {
    let mut store = state.store.write().await;
    store.projects.remove(&project_id).ok_or(PROJECT_NOT_FOUND)?;
    store.columns.remove(&project_id);
    store.tasks.retain(|_, task| task.project_id != project_id);
    Ok(StatusCode::OK)
}

/// Completed tasks are left out, as on the real endpoint.
async fn get_project_data(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectData>, Failure> {
    let store = state.store.read().await;
    let project = store.projects.get(&project_id).cloned().ok_or(PROJECT_NOT_FOUND)?;
    let mut tasks: Vec<Task> = store
        .tasks
        .values()
        .filter(|task| task.project_id == project_id && task.status != TASK_STATUS_COMPLETED)
        .cloned()
        .collect();
    tasks.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.title.cmp(&b.title)));
    let columns = store.columns.get(&project_id).cloned().unwrap_or_default();
    Ok(Json(ProjectData {
        project,
        tasks,
        columns,
    }))
}

// --- tasks ---

fn checklist_item(input: ChecklistItemInput) -> ChecklistItem {
    ChecklistItem {
        id: new_id(),
        title: input.title,
        status: input.status.unwrap_or_default(),
        completed_time: input.completed_time.unwrap_or_default(),
        is_all_day: input.is_all_day.unwrap_or_default(),
        sort_order: input.sort_order.unwrap_or_default(),
        start_date: input.start_date.unwrap_or_default(),
        time_zone: input.time_zone.unwrap_or_default(),
    }
}

fn apply_fields(task: &mut Task, fields: TaskFields) {
    if let Some(content) = fields.content {
        task.content = content;
    }
    if let Some(desc) = fields.desc {
        task.desc = desc;
    }
    if let Some(is_all_day) = fields.is_all_day {
        task.is_all_day = is_all_day;
    }
    if let Some(start_date) = fields.start_date {
        task.start_date = start_date;
    }
    if let Some(due_date) = fields.due_date {
        task.due_date = due_date;
    }
    if let Some(time_zone) = fields.time_zone {
        task.time_zone = time_zone;
    }
    if let Some(reminders) = fields.reminders {
        task.reminders = reminders;
    }
    if let Some(repeat_flag) = fields.repeat_flag {
        task.repeat_flag = repeat_flag;
    }
    if let Some(priority) = fields.priority {
        task.priority = priority;
    }
    if let Some(sort_order) = fields.sort_order {
        task.sort_order = sort_order;
    }
    if let Some(items) = fields.items {
        task.items = items.into_iter().map(checklist_item).collect();
    }
}

async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> Result<Json<Task>, Failure> {
    let mut store = state.store.write().await;
    if !store.projects.contains_key(&input.project_id) {
        return Err(PROJECT_NOT_FOUND);
    }
    let mut task = Task {
        id: new_id(),
        project_id: input.project_id,
        title: input.title,
        kind: "TEXT".to_string(),
        ..Task::default()
    };
    apply_fields(&mut task, input.fields);
    store.tasks.insert(task.id.clone(), task.clone());
    debug!(id = %task.id, project_id = %task.project_id, "task created");
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Task>, Failure> {
    if input.id != task_id {
        return Err((StatusCode::BAD_REQUEST, "task id mismatch"));
    }
    let mut store = state.store.write().await;
    if !store.projects.contains_key(&input.project_id) {
        return Err(PROJECT_NOT_FOUND);
    }
    let task = store.tasks.get_mut(&task_id).ok_or(TASK_NOT_FOUND)?;
    task.project_id = input.project_id;
    if let Some(title) = input.title {
        task.title = title;
    }
    apply_fields(task, input.fields);
    Ok(Json(task.clone()))
}

async fn get_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> Result<Json<Task>, Failure> {
    let store = state.store.read().await;
    store
        .tasks
        .get(&task_id)
        .filter(|task| task.project_id == project_id)
        .cloned()
        .map(Json)
        .ok_or(TASK_NOT_FOUND)
}

async fn complete_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> Result<StatusCode, Failure> {
    let mut store = state.store.write().await;
    let task = store
        .tasks
        .get_mut(&task_id)
        .filter(|task| task.project_id == project_id)
        .ok_or(TASK_NOT_FOUND)?;
    task.status = TASK_STATUS_COMPLETED;
    task.completed_time = Value::from(chrono::Utc::now().timestamp_millis());
    Ok(StatusCode::OK)
}

async fn delete_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> Result<StatusCode, Failure> {
    let mut store = state.store.write().await;
    let owned = store
        .tasks
        .get(&task_id)
        .is_some_and(|task| task.project_id == project_id);
    if !owned {
        return Err(TASK_NOT_FOUND);
    }
    store.tasks.remove(&task_id);
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_omits_null_dates() {
        let task = Task {
            id: "t1".to_string(),
            ..Task::default()
        };
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("startDate").is_none());
        assert!(json.get("completedTime").is_none());
        assert_eq!(json["projectId"], "");
    }

    #[test]
    fn create_task_collects_flattened_fields() {
        let input: CreateTask = serde_json::from_str(
            r#"{"title":"T","projectId":"p","isAllDay":false,"dueDate":"2024-01-01T00:00:00+0000"}"#,
        )
        .unwrap();
        assert_eq!(input.fields.is_all_day, Some(false));
        assert_eq!(input.fields.due_date, Some(Value::from("2024-01-01T00:00:00+0000")));
        assert!(input.fields.priority.is_none());
    }

    #[test]
    fn apply_fields_only_touches_present_keys() {
        let mut task = Task {
            title: "Keep".to_string(),
            priority: 5,
            content: "old".to_string(),
            ..Task::default()
        };
        let fields: TaskFields = serde_json::from_str(r#"{"priority":0}"#).unwrap();
        apply_fields(&mut task, fields);
        assert_eq!(task.priority, 0);
        assert_eq!(task.content, "old");
    }

    #[test]
    fn update_project_all_fields_optional() {
        let input: UpdateProject = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none());
        assert!(input.kind.is_none());
    }

    #[test]
    fn create_project_rejects_missing_name() {
        let result: Result<CreateProject, _> = serde_json::from_str(r##"{"color":"#fff"}"##);
        assert!(result.is_err());
    }
}
