//! Stateless HTTP request builder and response parser for the Open API.
//!
//! # Design
//! `TickTickClient` holds only the base URL and the access token. Each
//! operation is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that consumes an `HttpResponse`. The caller, or a
//! [`crate::BlockingClient`], executes the round-trip in between.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CreateProjectRequest, CreateTaskRequest, Project, ProjectData, Task, UpdateProjectRequest,
    UpdateTaskRequest,
};

const API_PREFIX: [&str; 2] = ["open", "v1"];

#[derive(Clone)]
pub struct TickTickClient {
    base_url: Url,
    access_token: String,
}

impl TickTickClient {
    /// Any path on `base_url` is kept as a prefix; a trailing slash is ignored.
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{base_url}: cannot carry a path"
            )));
        }
        Ok(Self {
            base_url: parsed,
            access_token: access_token.to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, &config.access_token)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // --- projects ---

    pub fn build_get_projects(&self) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, &["project"])
    }

    pub fn build_get_project(&self, project_id: &str) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, &["project", project_id])
    }

    pub fn build_get_project_data(&self, project_id: &str) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, &["project", project_id, "data"])
    }

    pub fn build_create_project(
        &self,
        input: &CreateProjectRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, &["project"], input)
    }

    pub fn build_update_project(
        &self,
        project_id: &str,
        input: &UpdateProjectRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, &["project", project_id], input)
    }

    pub fn build_delete_project(&self, project_id: &str) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Delete, &["project", project_id])
    }

    // --- tasks ---

    pub fn build_get_task(
        &self,
        project_id: &str,
        task_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, &["project", project_id, "task", task_id])
    }

    pub fn build_create_task(&self, input: &CreateTaskRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, &["task"], input)
    }

    pub fn build_update_task(
        &self,
        task_id: &str,
        input: &UpdateTaskRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, &["task", task_id], input)
    }

    pub fn build_complete_task(
        &self,
        project_id: &str,
        task_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.request(
            HttpMethod::Post,
            &["project", project_id, "task", task_id, "complete"],
        )
    }

    pub fn build_delete_task(
        &self,
        project_id: &str,
        task_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Delete, &["project", project_id, "task", task_id])
    }

    // --- parsers ---

    pub fn parse_get_projects(&self, response: HttpResponse) -> Result<Vec<Project>, ApiError> {
        decode_body(response)
    }

    pub fn parse_get_project(&self, response: HttpResponse) -> Result<Project, ApiError> {
        decode_body(response)
    }

    pub fn parse_get_project_data(&self, response: HttpResponse) -> Result<ProjectData, ApiError> {
        decode_body(response)
    }

    pub fn parse_create_project(&self, response: HttpResponse) -> Result<Project, ApiError> {
        decode_body(response)
    }

    pub fn parse_update_project(&self, response: HttpResponse) -> Result<Project, ApiError> {
        decode_body(response)
    }

    pub fn parse_delete_project(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response).map(drop)
    }

    pub fn parse_get_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        decode_body(response)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        decode_body(response)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        decode_body(response)
    }

    pub fn parse_complete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response).map(drop)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response).map(drop)
    }

    /// `Url::path_segments_mut` drops `.` and `..` segments and an empty one
    /// would hit the parent path, so those ids are refused.
    fn url(&self, segments: &[&str]) -> Result<String, ApiError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::InvalidPath(format!("{bad:?} is not a usable id")));
        }
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        Ok(url.into())
    }

    fn request(&self, method: HttpMethod, segments: &[&str]) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method,
            url: self.url(segments)?,
            headers: vec![(
                "authorization".to_string(),
                format!("Bearer {}", self.access_token),
            )],
            body: None,
        })
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        segments: &[&str],
        input: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(ApiError::Serialization)?;
        let mut request = self.request(method, segments)?;
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }
}

impl fmt::Debug for TickTickClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickTickClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Map any status outside 200..=299 to `ApiError::Http`.
fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body,
    })
}

fn decode_body<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let response = check_status(response)?;
    if response.body.trim().is_empty() {
        return Err(ApiError::EmptyResponse {
            status: response.status,
        });
    }
    serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
}
