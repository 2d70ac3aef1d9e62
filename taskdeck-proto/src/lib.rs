//! Wire model for the `TaskDeck` task API.
//!
//! Tasks, tags and user identities as the remote API serializes them
//! (JSON, Mongo-style `_id` keys), plus the request bodies the client
//! sends and the envelopes it receives back.

pub mod auth;
pub mod response;
pub mod tag;
pub mod task;
pub mod validate;

pub use auth::{AuthResponse, SignInRequest, SignUpRequest, UserIdentity};
pub use tag::{DEFAULT_TAG_COLOR, NewTag, Tag, TagPatch, TagReference};
pub use task::{NewTask, TagStat, Task, TaskFilter, TaskPatch, TaskStats};
pub use validate::ValidationError;
