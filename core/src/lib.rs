//! Typed client for the TickTick Open API.
//!
//! # Overview
//! Projects, tasks, checklist items and kanban columns as plain Rust
//! records, plus an I/O-free request builder / response parser and a
//! blocking transport built on `ureq`.
//!
//! ```no_run
//! use ticktick::{opt, priority, BlockingClient, ClientConfig, CreateTaskRequest};
//!
//! # fn main() -> Result<(), ticktick::ApiError> {
//! let client = BlockingClient::from_config(&ClientConfig::new("your-access-token"))?;
//! let projects = client.get_projects()?;
//! let task = client.create_task(&CreateTaskRequest {
//!     priority: opt::int(priority::HIGH),
//!     ..CreateTaskRequest::new("Buy groceries", &projects[0].id)
//! })?;
//! client.complete_task(&task.project_id, &task.id)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - `TickTickClient` only builds `HttpRequest`s and parses `HttpResponse`s
//!   (host-does-IO). `BlockingClient` runs them through a `Transport`.
//! - Request records use `Option<T>` for optional fields: `None` is left out
//!   of the body, `Some(zero)` is sent as is.
//! - `Time` reads every date shape the service produces and always writes
//!   `2019-11-13T03:00:00+0000`, or `""` for "no date".

pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod opt;
pub mod time;
pub mod transport;
pub mod types;

pub use blocking::BlockingClient;
pub use client::TickTickClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DIDA365_BASE_URL};
pub use error::{ApiError, TimeError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use time::Time;
pub use transport::{Transport, UreqTransport};
pub use types::{
    checklist_status, priority, task_status, ChecklistItem, Column, CreateChecklistItemRequest,
    CreateProjectRequest, CreateTaskRequest, Project, ProjectData, Task, UpdateProjectRequest,
    UpdateTaskRequest,
};
