//! Task Manager API Library
//!
//! A CRUD service for task records over a pluggable document store, plus the
//! client-side sync agent that drives it.

pub mod api;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod store;
