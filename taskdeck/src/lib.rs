//! `TaskDeck`: session-aware client for a remote task-management API.
//!
//! The session store owns the bearer token, the gateways in [`api`] map
//! operations to HTTP calls, and the task and tag view-models cache the
//! last server response for presentation.

pub mod api;
pub mod cli;
pub mod config;
pub mod session;
pub mod state;
pub mod tags;
pub mod tasks;
