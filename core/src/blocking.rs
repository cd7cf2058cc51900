//! One method per API operation: build, execute, parse.

use tracing::{debug, warn};

use crate::client::TickTickClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    CreateProjectRequest, CreateTaskRequest, Project, ProjectData, Task, UpdateProjectRequest,
    UpdateTaskRequest,
};

/// Pairs a `TickTickClient` with a `Transport`. Each call issues exactly one
/// request; nothing is retried or cached.
pub struct BlockingClient<T = UreqTransport> {
    client: TickTickClient,
    transport: T,
}

impl BlockingClient<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = TickTickClient::from_config(config)?;
        Ok(Self::with_transport(client, UreqTransport::new(config.timeout)))
    }
}

impl<T: Transport> BlockingClient<T> {
    pub fn with_transport(client: TickTickClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn requests(&self) -> &TickTickClient {
        &self.client
    }

    pub fn get_projects(&self) -> Result<Vec<Project>, ApiError> {
        let response = self.send(self.client.build_get_projects()?)?;
        self.client.parse_get_projects(response)
    }

    pub fn get_project(&self, project_id: &str) -> Result<Project, ApiError> {
        let response = self.send(self.client.build_get_project(project_id)?)?;
        self.client.parse_get_project(response)
    }

    pub fn get_project_data(&self, project_id: &str) -> Result<ProjectData, ApiError> {
        let response = self.send(self.client.build_get_project_data(project_id)?)?;
        self.client.parse_get_project_data(response)
    }

    pub fn create_project(&self, input: &CreateProjectRequest) -> Result<Project, ApiError> {
        let response = self.send(self.client.build_create_project(input)?)?;
        self.client.parse_create_project(response)
    }

    pub fn update_project(
        &self,
        project_id: &str,
        input: &UpdateProjectRequest,
    ) -> Result<Project, ApiError> {
        let response = self.send(self.client.build_update_project(project_id, input)?)?;
        self.client.parse_update_project(response)
    }

    pub fn delete_project(&self, project_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_project(project_id)?)?;
        self.client.parse_delete_project(response)
    }

    pub fn get_task(&self, project_id: &str, task_id: &str) -> Result<Task, ApiError> {
        let response = self.send(self.client.build_get_task(project_id, task_id)?)?;
        self.client.parse_get_task(response)
    }

    pub fn create_task(&self, input: &CreateTaskRequest) -> Result<Task, ApiError> {
        let response = self.send(self.client.build_create_task(input)?)?;
        self.client.parse_create_task(response)
    }

    pub fn update_task(&self, task_id: &str, input: &UpdateTaskRequest) -> Result<Task, ApiError> {
        let response = self.send(self.client.build_update_task(task_id, input)?)?;
        self.client.parse_update_task(response)
    }

    pub fn complete_task(&self, project_id: &str, task_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_complete_task(project_id, task_id)?)?;
        self.client.parse_complete_task(response)
    }

    pub fn delete_task(&self, project_id: &str, task_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_task(project_id, task_id)?)?;
        self.client.parse_delete_task(response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let url = request.url.clone();
        debug!(method, url = %url, "sending request");
        let response = self.transport.execute(request)?;
        if response.is_success() {
            debug!(method, url = %url, status = response.status, "request succeeded");
        } else {
            warn!(method, url = %url, status = response.status, "request failed");
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::http::HttpMethod;

    /// Replays canned responses and records every request it sees.
    struct Scripted {
        responses: RefCell<Vec<HttpResponse>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: RefCell::new(responses),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request);
            let mut responses = self.responses.borrow_mut();
            if responses.is_empty() {
                return Err(ApiError::Transport("no scripted response".to_string()));
            }
            Ok(responses.remove(0))
        }
    }

    fn blocking(transport: &Scripted) -> BlockingClient<&Scripted> {
        let client = TickTickClient::new("https://api.ticktick.com", "tok").unwrap();
        BlockingClient::with_transport(client, transport)
    }

    #[test]
    fn create_task_sends_body_and_parses_reply() {
        let transport = Scripted::new(vec![HttpResponse::new(
            200,
            r#"{"id":"new1","projectId":"p1","title":"New Task"}"#,
        )]);
        let task = blocking(&transport)
            .create_task(&CreateTaskRequest::new("New Task", "p1"))
            .unwrap();
        assert_eq!(task.id, "new1");

        let seen = transport.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[0].header("authorization"), Some("Bearer tok"));
        assert_eq!(
            seen[0].body.as_deref(),
            Some(r#"{"title":"New Task","projectId":"p1"}"#)
        );
    }

    #[test]
    fn error_status_surfaces_as_http_error() {
        let transport = Scripted::new(vec![HttpResponse::new(403, "forbidden")]);
        let err = blocking(&transport).delete_project("p1").unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn transport_failure_propagates() {
        let transport = Scripted::new(Vec::new());
        let err = blocking(&transport).get_projects().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn complete_task_issues_single_post() {
        let transport = Scripted::new(vec![HttpResponse::new(200, "")]);
        blocking(&transport).complete_task("p1", "t1").unwrap();
        let seen = transport.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].url.ends_with("/open/v1/project/p1/task/t1/complete"));
    }
}
