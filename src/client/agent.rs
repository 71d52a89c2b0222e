//! Client sync agent.
//!
//! The agent owns the form, the edit mode and the last fetched list. Every
//! successful mutation is followed by a full reload; failures leave the
//! local state as it was and surface as alerts.

use std::fmt;

use super::api_client::{ClientError, TaskApiClient};
use super::state::{EditMode, TaskForm};
use crate::domain::{Task, TaskId};

pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load tasks. Please check if the server is running.";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create task";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update task";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete task";
pub const DETAILS_FAILED_MESSAGE: &str = "Failed to load task details";
pub const CREATED_MESSAGE: &str = "Task created successfully!";
pub const UPDATED_MESSAGE: &str = "Task updated successfully!";
pub const DELETED_MESSAGE: &str = "Task deleted successfully!";
pub const CONFIRM_DELETE_MESSAGE: &str = "Are you sure you want to delete this task?";

/// HTTP method announced before each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Output side of the client.
pub trait Presenter {
    /// Shows a non-empty task list.
    fn render_tasks(&mut self, tasks: &[Task]);

    /// Shows the empty-list placeholder.
    fn render_empty(&mut self);

    fn alert(&mut self, message: &str);

    /// Asks a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    fn show_method(&mut self, method: Method);

    /// Shows the form and whether it creates or edits.
    fn show_form(&mut self, form: &TaskForm, mode: &EditMode);
}

/// Drives the API on behalf of a [`Presenter`].
#[derive(Debug)]
pub struct SyncAgent<P> {
    client: TaskApiClient,
    presenter: P,
    form: TaskForm,
    mode: EditMode,
    tasks: Vec<Task>,
}

impl<P: Presenter> SyncAgent<P> {
    #[must_use]
    pub fn new(client: TaskApiClient, presenter: P) -> Self {
        Self {
            client,
            presenter,
            form: TaskForm::default(),
            mode: EditMode::Inactive,
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub const fn form(&self) -> &TaskForm {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut TaskForm {
        &mut self.form
    }

    #[must_use]
    pub const fn mode(&self) -> &EditMode {
        &self.mode
    }

    /// The list from the last successful load.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    pub const fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Fetches and renders the full list.
    ///
    /// Returns `true` if the list was refreshed.
    pub async fn load(&mut self) -> bool {
        self.presenter.show_method(Method::Get);

        match self.client.list().await {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "Loaded tasks");
                self.tasks = tasks;
                if self.tasks.is_empty() {
                    self.presenter.render_empty();
                } else {
                    self.presenter.render_tasks(&self.tasks);
                }
                true
            }
            Err(error) => {
                self.report(&error, LOAD_FAILED_MESSAGE);
                false
            }
        }
    }

    /// Creates or updates from the form, depending on the edit mode.
    ///
    /// Returns `true` on success.
    pub async fn submit(&mut self) -> bool {
        let result = match self.mode.editing_id() {
            Some(task_id) => {
                self.presenter.show_method(Method::Put);
                self.client
                    .update(task_id, &self.form.to_update_fields())
                    .await
                    .map(|_| UPDATED_MESSAGE)
                    .map_err(|error| (error, UPDATE_FAILED_MESSAGE))
            }
            None => {
                self.presenter.show_method(Method::Post);
                self.client
                    .create(&self.form.to_create_fields())
                    .await
                    .map(|_| CREATED_MESSAGE)
                    .map_err(|error| (error, CREATE_FAILED_MESSAGE))
            }
        };

        match result {
            Ok(message) => {
                self.presenter.alert(message);
                self.reset();
                self.load().await;
                true
            }
            Err((error, fallback)) => {
                self.report(&error, fallback);
                false
            }
        }
    }

    /// Loads a task into the form and switches to edit mode.
    ///
    /// Returns `true` if the task was loaded.
    pub async fn edit(&mut self, id: &TaskId) -> bool {
        self.presenter.show_method(Method::Get);

        match self.client.get(id).await {
            Ok(task) => {
                self.form = TaskForm::from_task(&task);
                self.mode = EditMode::Editing { task_id: task.id };
                self.presenter.show_form(&self.form, &self.mode);
                true
            }
            Err(error) => {
                self.report(&error, DETAILS_FAILED_MESSAGE);
                false
            }
        }
    }

    /// Deletes a task after confirmation.
    ///
    /// Returns `true` if the task was deleted; a declined confirmation sends
    /// no request.
    pub async fn delete(&mut self, id: &TaskId) -> bool {
        if !self.presenter.confirm(CONFIRM_DELETE_MESSAGE) {
            return false;
        }

        self.presenter.show_method(Method::Delete);

        match self.client.delete(id).await {
            Ok(_) => {
                self.presenter.alert(DELETED_MESSAGE);
                self.load().await;
                true
            }
            Err(error) => {
                self.report(&error, DELETE_FAILED_MESSAGE);
                false
            }
        }
    }

    /// Leaves edit mode and clears the form.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.form.clear();
        self.mode = EditMode::Inactive;
        self.presenter.show_form(&self.form, &self.mode);
    }

    fn report(&mut self, error: &ClientError, fallback: &str) {
        if error.is_api() {
            self.presenter.alert(&format!("Error: {error}"));
        } else {
            tracing::warn!(%error, "Request failed");
            self.presenter.alert(fallback);
        }
    }
}
