//! `TagViewModel`: the in-memory tag cache and its operations.

use parking_lot::Mutex;

use taskdeck_proto::response::TagTasksResponse;
use taskdeck_proto::{NewTag, Tag, TagPatch, TagReference};

use crate::api::{ApiClient, ApiError};
use crate::session::{AuthToken, Session};
use crate::state::{CachedList, LoadState};

/// In-memory cache of the user's tags.
///
/// Same concurrency and anonymous-session rules as
/// [`TaskViewModel`](crate::tasks::TaskViewModel).
pub struct TagViewModel {
    api: ApiClient,
    session: Session,
    cache: Mutex<CachedList<Tag>>,
}

impl TagViewModel {
    /// Creates an empty view-model acting as `session`.
    #[must_use]
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            cache: Mutex::new(CachedList::default()),
        }
    }

    /// Snapshot of the cached tags, in insertion order.
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        self.cache.lock().items.clone()
    }

    /// The cached tag with `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Tag> {
        self.cache.lock().items.iter().find(|t| t.id == id).cloned()
    }

    /// Resolves a task's tag reference against the cache.
    #[must_use]
    pub fn resolve(&self, reference: &TagReference) -> Option<Tag> {
        reference.resolve(&self.cache.lock().items).cloned()
    }

    /// Number of cached tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().items.len()
    }

    /// Returns `true` if the cache holds no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.lock().items.is_empty()
    }

    /// Current load/error state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.cache.lock().state()
    }

    /// The most recent error message, if one is recorded.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.cache.lock().error().map(str::to_string)
    }

    /// Returns `true` while a list fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.cache.lock().is_loading()
    }

    fn token(&self) -> Result<&AuthToken, ApiError> {
        self.session.token().ok_or(ApiError::NotAuthenticated)
    }

    /// Replaces the cache with the server's list.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the previous cache is kept.
    pub async fn load(&self) -> Result<(), ApiError> {
        let token = self.token()?;
        self.cache.lock().begin_load();
        let result = self.api.list_tags(token).await;
        self.cache.lock().settle_load("load tags", result)
    }

    /// Same as [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the previous cache is kept.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.load().await
    }

    /// Creates a tag, appends it, and hands it back so the caller can
    /// select it right away.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] (nothing is sent) or the gateway
    /// error; either is recorded and the cache is unchanged.
    pub async fn create(&self, tag: NewTag) -> Result<Tag, ApiError> {
        let token = self.token()?;
        if let Err(e) = tag.validate() {
            return Err(self.cache.lock().record_failure("create tag", e.into()));
        }
        let result = self.api.create_tag(token, &tag).await;
        self.cache.lock().settle("create tag", result, |items, created| {
            tracing::debug!(tag_id = %created.id, "tag created");
            items.push(created.clone());
            created
        })
    }

    /// Renames or recolors a tag and swaps in the server's copy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] (nothing is sent) or the gateway
    /// error; either is recorded and the cache is unchanged.
    pub async fn update(&self, id: &str, patch: TagPatch) -> Result<Tag, ApiError> {
        let token = self.token()?;
        if let Err(e) = patch.validate() {
            return Err(self.cache.lock().record_failure("update tag", e.into()));
        }
        let result = self.api.update_tag(token, id, &patch).await;
        self.cache.lock().settle("update tag", result, |items, updated| {
            if let Some(slot) = items.iter_mut().find(|t| t.id == id) {
                slot.clone_from(&updated);
            }
            updated
        })
    }

    /// Deletes a tag and drops it from the cache.
    ///
    /// Tasks that pointed at it are not touched here; refresh the task
    /// view-model to see what the server did with them.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the cache is unchanged.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let token = self.token()?;
        let result = self.api.delete_tag(token, id).await;
        self.cache.lock().settle("delete tag", result, |items, _| {
            items.retain(|t| t.id != id);
        })
    }

    /// Fetches the tag with `id` and the tasks carrying it. Not cached.
    ///
    /// # Errors
    ///
    /// Returns the gateway error, which is also recorded.
    pub async fn tasks_by_tag(&self, id: &str) -> Result<TagTasksResponse, ApiError> {
        let token = self.token()?;
        let result = self.api.tasks_by_tag(token, id).await;
        self.cache.lock().settle("tasks by tag", result, |_, found| found)
    }
}
