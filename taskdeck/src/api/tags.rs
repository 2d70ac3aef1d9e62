//! Tag endpoints.

use reqwest::Method;

use taskdeck_proto::response::{DeleteResponse, TagListResponse, TagResponse, TagTasksResponse};
use taskdeck_proto::{NewTag, Tag, TagPatch};

use super::{ApiClient, ApiError};
use crate::session::AuthToken;

impl ApiClient {
    /// `GET /tag`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to fetch tags").
    pub async fn list_tags(&self, token: &AuthToken) -> Result<Vec<Tag>, ApiError> {
        let request = self.request(Method::GET, &["tag"], Some(token))?;
        let body: TagListResponse = self.send(request, "Failed to fetch tags").await?;
        Ok(body.tags)
    }

    /// `POST /tag`. Returns the tag as stored by the server.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to create tag").
    pub async fn create_tag(&self, token: &AuthToken, tag: &NewTag) -> Result<Tag, ApiError> {
        let request = self.request(Method::POST, &["tag"], Some(token))?.json(tag);
        let body: TagResponse = self.send(request, "Failed to create tag").await?;
        Ok(body.tag)
    }

    /// `PUT /tag/{id}` with only the fields set in `patch`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to update tag").
    pub async fn update_tag(
        &self,
        token: &AuthToken,
        id: &str,
        patch: &TagPatch,
    ) -> Result<Tag, ApiError> {
        let request = self
            .request(Method::PUT, &["tag", id], Some(token))?
            .json(patch);
        let body: TagResponse = self.send(request, "Failed to update tag").await?;
        Ok(body.tag)
    }

    /// `DELETE /tag/{id}`. Tasks pointing at the tag are left to the server.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to delete tag").
    pub async fn delete_tag(&self, token: &AuthToken, id: &str) -> Result<DeleteResponse, ApiError> {
        let request = self.request(Method::DELETE, &["tag", id], Some(token))?;
        self.send(request, "Failed to delete tag").await
    }

    /// `GET /tag/{id}/todos`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] ("Failed to fetch todos by tag").
    pub async fn tasks_by_tag(
        &self,
        token: &AuthToken,
        id: &str,
    ) -> Result<TagTasksResponse, ApiError> {
        let request = self.request(Method::GET, &["tag", id, "todos"], Some(token))?;
        self.send(request, "Failed to fetch todos by tag").await
    }
}
