//! Request and response bodies for the task API.
//!
//! - `POST /api/tasks/create` returns [`TaskCreatedResponse`]
//! - `POST /api/tasks/{id}/add-link` takes an [`AddLinkForm`]
//! - `GET /api/tasks/{id}/status` returns [`TaskStatusResponse`]
//!
//! Status responses only carry the task's status and error messages; ids,
//! local paths and submitted links stay on the server.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::observability::MetricsSnapshot;
use crate::tasks::TaskView;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TaskCreatedResponse {
    pub task_id: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AddLinkForm {
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LinkAddedResponse {
    pub task_id: u64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TaskStatusResponse {
    pub task: TaskView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
    pub downloads_in_flight: usize,
    pub metrics: MetricsSnapshot,
}
