//! Client side of the task manager.
//!
//! [`TaskApiClient`] speaks the HTTP API; [`SyncAgent`] keeps the form, the
//! edit mode and the rendered list in step with the server through a
//! [`Presenter`].

pub mod agent;
pub mod api_client;
pub mod state;

pub use agent::{Method, Presenter, SyncAgent};
pub use api_client::{ClientError, ClientResult, TaskApiClient};
pub use state::{EditMode, TaskForm};
