//! `TaskViewModel`: the in-memory task cache and its operations.

use parking_lot::Mutex;

use taskdeck_proto::response::TaskPage;
use taskdeck_proto::task::MAX_TASK_TITLE_LENGTH;
use taskdeck_proto::{NewTask, Task, TaskFilter, TaskPatch, TaskStats};

use crate::api::{ApiClient, ApiError};
use crate::session::{AuthToken, Session};
use crate::state::{CachedList, LoadState};

/// In-memory cache of the user's tasks.
///
/// Operations take `&self` and may run concurrently. They are not
/// serialized: the cache reflects whichever response resolves last.
/// Callers that need ordering await each mutation before the next.
///
/// With an anonymous session every operation returns
/// [`ApiError::NotAuthenticated`] without sending a request or touching
/// the cache and state.
pub struct TaskViewModel {
    api: ApiClient,
    session: Session,
    max_title_len: usize,
    cache: Mutex<CachedList<Task>>,
    last_page: Mutex<Option<TaskPage>>,
}

impl TaskViewModel {
    /// Creates an empty view-model acting as `session`.
    #[must_use]
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            max_title_len: MAX_TASK_TITLE_LENGTH,
            cache: Mutex::new(CachedList::default()),
            last_page: Mutex::new(None),
        }
    }

    /// Overrides the maximum title length enforced before sending.
    #[must_use]
    pub const fn with_max_title_len(mut self, max: usize) -> Self {
        self.max_title_len = max;
        self
    }

    /// Snapshot of the cached tasks, in insertion order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.cache.lock().items.clone()
    }

    /// The cached task with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Task> {
        self.cache.lock().items.iter().find(|t| t.id == id).cloned()
    }

    /// Cached tasks whose tag reference points at `tag_id`.
    #[must_use]
    pub fn tasks_with_tag(&self, tag_id: &str) -> Vec<Task> {
        self.cache
            .lock()
            .items
            .iter()
            .filter(|t| t.tag.as_ref().is_some_and(|r| r.points_at(tag_id)))
            .cloned()
            .collect()
    }

    /// Number of cached tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().items.len()
    }

    /// Returns `true` if the cache holds no tasks.
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

    /// Paging metadata of the list fetch that settled last with success.
    #[must_use]
    pub fn page(&self) -> Option<TaskPage> {
        *self.last_page.lock()
    }

    fn token(&self) -> Result<&AuthToken, ApiError> {
        self.session.token().ok_or(ApiError::NotAuthenticated)
    }

    /// Replaces the cache with the server's full list.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the previous cache is kept.
    pub async fn load(&self) -> Result<(), ApiError> {
        self.load_filtered(&TaskFilter::default()).await
    }

    /// Replaces the cache with the server's list for `filter`.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the previous cache is kept.
    pub async fn load_filtered(&self, filter: &TaskFilter) -> Result<(), ApiError> {
        let token = self.token()?;
        self.cache.lock().begin_load();
        let result = self.api.list_tasks(token, filter).await;
        let mut cache = self.cache.lock();
        let result = result.map(|list| {
            *self.last_page.lock() = Some(list.pagination);
            list.todos
        });
        cache.settle_load("load tasks", result)
    }

    /// Re-fetches the list so the cache matches the server after
    /// mutations with side effects (tag statistics, batch deletes).
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.load().await
    }

    /// Creates a task and appends the server's copy to the cache.
    ///
    /// Nothing is inserted until the server answers.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] (nothing is sent) or the gateway
    /// error; either is recorded and the cache is unchanged.
    pub async fn create(&self, task: NewTask) -> Result<Task, ApiError> {
        let token = self.token()?;
        if let Err(e) = task.validate(self.max_title_len) {
            return Err(self.cache.lock().record_failure("create task", e.into()));
        }
        let result = self.api.create_task(token, &task).await;
        self.cache.lock().settle("create task", result, |items, created| {
            tracing::debug!(task_id = %created.id, "task created");
            items.push(created.clone());
            created
        })
    }

    /// Sends the fields set in `patch` and swaps in the server's copy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] (nothing is sent) or the gateway
    /// error; either is recorded and the cache is unchanged.
    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, ApiError> {
        let token = self.token()?;
        if let Err(e) = patch.validate(self.max_title_len) {
            return Err(self.cache.lock().record_failure("update task", e.into()));
        }
        let result = self.api.update_task(token, id, &patch).await;
        self.cache
            .lock()
            .settle("update task", result, |items, updated| replace(items, id, updated))
    }

    /// Deletes a task and drops it from the cache.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the cache is unchanged.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let token = self.token()?;
        let result = self.api.delete_task(token, id).await;
        self.cache.lock().settle("delete task", result, |items, _| {
            tracing::debug!(task_id = %id, "task deleted");
            items.retain(|t| t.id != id);
        })
    }

    /// Flips the completion flag and swaps in the server's copy.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the cache is unchanged.
    pub async fn toggle_completion(&self, id: &str) -> Result<Task, ApiError> {
        let token = self.token()?;
        let result = self.api.toggle_task(token, id).await;
        self.cache
            .lock()
            .settle("toggle task", result, |items, toggled| replace(items, id, toggled))
    }

    /// Deletes every completed task and drops them from the cache.
    ///
    /// Returns the count reported by the server, or the number of cached
    /// tasks removed if the server does not report one.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the cache is unchanged.
    pub async fn clear_completed(&self) -> Result<u64, ApiError> {
        let token = self.token()?;
        let result = self.api.delete_completed_tasks(token).await;
        self.cache.lock().settle("clear completed", result, |items, resp| {
            let before = items.len();
            items.retain(|t| !t.completed);
            resp.deleted_count
                .unwrap_or_else(|| u64::try_from(before - items.len()).unwrap_or(u64::MAX))
        })
    }

    /// Fetches aggregate statistics. Not cached.
    ///
    /// # Errors
    ///
    /// Returns the gateway error, which is also recorded.
    pub async fn stats(&self) -> Result<TaskStats, ApiError> {
        let token = self.token()?;
        let result = self.api.task_stats(token).await;
        self.cache.lock().settle("task stats", result, |_, stats| stats)
    }

    /// Fetches completed (`true`) or pending (`false`) tasks. Not cached.
    ///
    /// # Errors
    ///
    /// Returns the gateway error, which is also recorded.
    pub async fn by_status(&self, completed: bool) -> Result<Vec<Task>, ApiError> {
        let token = self.token()?;
        let result = self.api.tasks_by_status(token, completed).await;
        self.cache.lock().settle("tasks by status", result, |_, tasks| tasks)
    }
}

/// Swaps the cached entry with `id` for `fresh` and hands `fresh` back.
fn replace(items: &mut [Task], id: &str, fresh: Task) -> Task {
    if let Some(slot) = items.iter_mut().find(|t| t.id == id) {
        slot.clone_from(&fresh);
    }
    fresh
}
