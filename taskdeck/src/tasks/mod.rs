//! Task list view-model.
//!
//! Caches the signed-in user's tasks in server order, mutated only through
//! the task gateway. Every operation returns its outcome and also records
//! failures in the observable [`LoadState`](crate::state::LoadState), so
//! presentation can either await the result or just re-read the state.

pub mod view_model;

pub use view_model::TaskViewModel;
