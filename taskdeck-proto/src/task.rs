//! Tasks ("todos"), their request bodies, list filters and statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::tag::TagReference;
use crate::validate::{self, ValidationError};

/// Default maximum task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// A task as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Task title (non-empty).
    pub title: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Calendar due date.
    #[serde(default, with = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Zero-or-one tag, by id or inlined.
    #[serde(rename = "tagId", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagReference>,
    /// Identifier of the owning user.
    #[serde(rename = "userId", default)]
    pub owner: String,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// When the server created the task.
    pub created_at: DateTime<Utc>,
    /// When the server last modified the task.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Identifier of the task's tag, if it has one.
    #[must_use]
    pub fn tag_id(&self) -> Option<&str> {
        self.tag.as_ref().map(TagReference::id)
    }

    /// Returns `true` if the task is open and its due date is before `today`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|d| d < today)
    }
}

/// Request body for creating a task.
///
/// Identifier, owner and timestamps are assigned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional due date, sent as `YYYY-MM-DD`.
    #[serde(with = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Optional tag identifier.
    #[serde(rename = "tagId", skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    /// Initial completion flag.
    pub completed: bool,
}

impl NewTask {
    /// An open task with only a title.
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Attaches the task to a tag.
    #[must_use]
    pub fn with_tag(mut self, tag_id: &str) -> Self {
        self.tag_id = Some(tag_id.to_string());
        self
    }

    /// Checks the title before the task is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TitleEmpty`] or
    /// [`ValidationError::TitleTooLong`].
    pub fn validate(&self, max_title_len: usize) -> Result<(), ValidationError> {
        validate::check_title(&self.title, max_title_len)
    }
}

/// Partial update of a task; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New due date.
    #[serde(with = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// New tag identifier.
    #[serde(rename = "tagId", skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    /// New completion flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Returns `true` if the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.tag_id.is_none()
            && self.completed.is_none()
    }

    /// Checks a new title, if the patch sets one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TitleEmpty`] or
    /// [`ValidationError::TitleTooLong`].
    pub fn validate(&self, max_title_len: usize) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) => validate::check_title(title, max_title_len),
            None => Ok(()),
        }
    }
}

/// Query parameters for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskFilter {
    /// Only tasks carrying this tag id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Only completed (`true`) or open (`false`) tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Server-side sort key, e.g. `-createdAt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Aggregate counters from `GET /todo/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    /// All tasks of the user.
    pub total: u64,
    /// Completed tasks.
    pub completed: u64,
    /// Open tasks.
    pub pending: u64,
    /// Completed share, as reported by the server.
    #[serde(default)]
    pub completion_rate: f64,
    /// Per-tag breakdown.
    #[serde(default)]
    pub tag_stats: Vec<TagStat>,
}

/// One row of the per-tag breakdown in [`TaskStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStat {
    /// Name and color of the tag the row counts.
    #[serde(rename = "_id")]
    pub tag: TagStatKey,
    /// Tasks with this tag.
    pub total: u64,
    /// Completed tasks with this tag.
    pub completed: u64,
    /// Open tasks with this tag.
    pub pending: u64,
}

/// Grouping key of a [`TagStat`] row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStatKey {
    /// Tag name.
    #[serde(default)]
    pub name: String,
    /// Tag color.
    #[serde(default)]
    pub color: String,
}

/// Parses a due date given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] if neither form matches.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Serde adapter for optional due dates.
mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.filter(|s| !s.trim().is_empty())
            .map(|s| super::parse_due_date(&s).map_err(de::Error::custom))
            .transpose()
    }
}
