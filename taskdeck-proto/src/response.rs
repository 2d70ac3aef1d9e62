//! Response envelopes of the task and tag endpoints.
//!
//! Every endpoint wraps its payload next to a human-readable `message`.
//! Error responses carry only the message, decoded as [`ErrorBody`].

use serde::Deserialize;

use crate::tag::Tag;
use crate::task::Task;

/// Body of a non-success response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Server-supplied explanation.
    #[serde(default)]
    pub message: Option<String>,
}

/// Paging metadata sent next to a task list. Absent fields were not sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    /// Number of tasks in this page.
    #[serde(default)]
    pub count: Option<u64>,
    /// Number of tasks matching the filter.
    #[serde(default)]
    pub total: Option<u64>,
    /// Current page.
    #[serde(default)]
    pub page: Option<u32>,
    /// Number of pages.
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// `GET /todo` and the other list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskListResponse {
    /// The tasks, in server order.
    #[serde(default)]
    pub todos: Vec<Task>,
    /// Paging metadata, flattened into the envelope.
    #[serde(flatten)]
    pub pagination: TaskPage,
}

/// Endpoints returning a single task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskResponse {
    /// The created or modified task.
    pub todo: Task,
}

/// Endpoints that only delete.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// Human-readable outcome.
    #[serde(default)]
    pub message: Option<String>,
    /// Number of deleted records, for batch deletes.
    #[serde(default)]
    pub deleted_count: Option<u64>,
}

/// `GET /tag`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagListResponse {
    /// The user's tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Endpoints returning a single tag.
#[derive(Debug, Clone, Deserialize)]
pub struct TagResponse {
    /// The created or modified tag.
    pub tag: Tag,
}

/// `GET /tag/{id}/todos`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagTasksResponse {
    /// The tag itself.
    pub tag: Tag,
    /// Tasks carrying the tag.
    #[serde(default)]
    pub todos: Vec<Task>,
}
