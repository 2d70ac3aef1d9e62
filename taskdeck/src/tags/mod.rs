//! Tag list view-model.
//!
//! Same shape as [`crate::tasks`], restricted to tags. Creation hands the
//! new tag back to the caller so it can be selected immediately.

pub mod view_model;

pub use view_model::TagViewModel;
