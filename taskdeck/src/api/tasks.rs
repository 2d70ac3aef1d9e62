//! Task ("todo") endpoints.

use reqwest::Method;
use serde_json::json;

use taskdeck_proto::response::{DeleteResponse, TaskListResponse, TaskResponse};
use taskdeck_proto::{NewTask, Task, TaskFilter, TaskPatch, TaskStats};

use super::{ApiClient, ApiError};
use crate::session::AuthToken;

impl ApiClient {
    /// `GET /todo`, with `filter` as query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to fetch todos").
    pub async fn list_tasks(
        &self,
        token: &AuthToken,
        filter: &TaskFilter,
    ) -> Result<TaskListResponse, ApiError> {
        let request = self
            .request(Method::GET, &["todo"], Some(token))?
            .query(filter);
        self.send(request, "Failed to fetch todos").await
    }

    /// `POST /todo/add-todo`. Returns the task as stored by the server.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to create todo").
    pub async fn create_task(&self, token: &AuthToken, task: &NewTask) -> Result<Task, ApiError> {
        let request = self
            .request(Method::POST, &["todo", "add-todo"], Some(token))?
            .json(task);
        let body: TaskResponse = self.send(request, "Failed to create todo").await?;
        Ok(body.todo)
    }

    /// `PUT /todo/{id}` with only the fields set in `patch`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to update todo").
    pub async fn update_task(
        &self,
        token: &AuthToken,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, ApiError> {
        let request = self
            .request(Method::PUT, &["todo", id], Some(token))?
            .json(patch);
        let body: TaskResponse = self.send(request, "Failed to update todo").await?;
        Ok(body.todo)
    }

    /// `DELETE /todo/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to delete todo").
    pub async fn delete_task(&self, token: &AuthToken, id: &str) -> Result<DeleteResponse, ApiError> {
        let request = self.request(Method::DELETE, &["todo", id], Some(token))?;
        self.send(request, "Failed to delete todo").await
    }

    /// `PATCH /todo/{id}/toggle-complete`. Returns the flipped task.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to toggle todo completion").
    pub async fn toggle_task(&self, token: &AuthToken, id: &str) -> Result<Task, ApiError> {
        let request = self
            .request(Method::PATCH, &["todo", id, "toggle-complete"], Some(token))?
            .json(&json!({}));
        let body: TaskResponse = self
            .send(request, "Failed to toggle todo completion")
            .await?;
        Ok(body.todo)
    }

    /// `DELETE /todo/batch/completed`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to delete completed todos").
    pub async fn delete_completed_tasks(&self, token: &AuthToken) -> Result<DeleteResponse, ApiError> {
        let request = self.request(Method::DELETE, &["todo", "batch", "completed"], Some(token))?;
        self.send(request, "Failed to delete completed todos").await
    }

    /// `GET /todo/stats`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to fetch todo stats").
    pub async fn task_stats(&self, token: &AuthToken) -> Result<TaskStats, ApiError> {
        let request = self.request(Method::GET, &["todo", "stats"], Some(token))?;
        self.send(request, "Failed to fetch todo stats").await
    }

    /// `GET /todo/status/{completed|pending}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to fetch completed todos" or
    /// "Failed to fetch pending todos").
    pub async fn tasks_by_status(
        &self,
        token: &AuthToken,
        completed: bool,
    ) -> Result<Vec<Task>, ApiError> {
        let status = if completed { "completed" } else { "pending" };
        let request = self.request(Method::GET, &["todo", "status", status], Some(token))?;
        let fallback = format!("Failed to fetch {status} todos");
        let body: TaskListResponse = self.send(request, &fallback).await?;
        Ok(body.todos)
    }
}
