//! Tags and the tagged-union reference a task holds to one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Color assigned to a new tag when the caller does not pick one.
pub const DEFAULT_TAG_COLOR: &str = "#8B5CF6";

/// A user-owned label that tasks may point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name (non-empty).
    pub name: String,
    /// Display color, usually a `#rrggbb` string.
    #[serde(default)]
    pub color: String,
    /// Identifier of the owning user.
    #[serde(rename = "userId", default)]
    pub owner: String,
    /// When the server created the tag. Populated relations may omit it.
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A task's pointer to a tag.
///
/// The API returns either the bare tag id or, when it populates the
/// relation, the whole tag record. Both decode into this enum; callers
/// go through [`id`](Self::id) and [`resolve`](Self::resolve) instead of
/// inspecting the JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagReference {
    /// The server inlined the tag record.
    Inline(Tag),
    /// Only the tag identifier.
    ById(String),
}

impl TagReference {
    /// Identifier of the referenced tag, whichever form it arrived in.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Inline(tag) => &tag.id,
            Self::ById(id) => id,
        }
    }

    /// Resolves the reference to a full tag.
    ///
    /// Inline references resolve to themselves; id references are looked
    /// up in `known`. Returns `None` for an id that is not in `known`.
    #[must_use]
    pub fn resolve<'a>(&'a self, known: &'a [Tag]) -> Option<&'a Tag> {
        match self {
            Self::Inline(tag) => Some(tag),
            Self::ById(id) => known.iter().find(|t| &t.id == id),
        }
    }

    /// Returns `true` if this reference points at the tag with `tag_id`.
    #[must_use]
    pub fn points_at(&self, tag_id: &str) -> bool {
        self.id() == tag_id
    }
}

impl From<Tag> for TagReference {
    fn from(tag: Tag) -> Self {
        Self::Inline(tag)
    }
}

/// Request body for creating a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTag {
    /// Tag name; trimmed before sending.
    pub name: String,
    /// Display color.
    pub color: String,
}

impl NewTag {
    /// A tag with the given name and [`DEFAULT_TAG_COLOR`].
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            color: DEFAULT_TAG_COLOR.to_string(),
        }
    }

    /// Overrides the display color.
    #[must_use]
    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    /// Rejects an empty name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TagNameEmpty`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::TagNameEmpty);
        }
        Ok(())
    }
}

/// Partial update of a tag; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagPatch {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TagPatch {
    /// Returns `true` if the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }

    /// Rejects a rename to an empty name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TagNameEmpty`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(ValidationError::TagNameEmpty),
            _ => Ok(()),
        }
    }
}
