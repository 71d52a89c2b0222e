//! Client-side form and edit state.

use crate::domain::{CreateTaskFields, Priority, Task, TaskId, TaskStatus, UpdateTaskFields};

/// Whether the form creates a new task or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Submitting creates a task.
    #[default]
    Inactive,
    /// Submitting updates `task_id`.
    Editing { task_id: TaskId },
}

impl EditMode {
    /// Returns the id under edit, if any.
    #[must_use]
    pub const fn editing_id(&self) -> Option<&TaskId> {
        match self {
            Self::Inactive => None,
            Self::Editing { task_id } => Some(task_id),
        }
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }
}

/// The five editable fields, held as the raw strings a form would carry.
///
/// `due_date` is `YYYY-MM-DD` or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub due_date: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::default().as_str().to_string(),
            priority: Priority::default().as_str().to_string(),
            due_date: String::new(),
        }
    }
}

impl TaskForm {
    /// Populates a form from an existing task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.as_str().to_string(),
            priority: task.priority.as_str().to_string(),
            due_date: task
                .due_date
                .map(|due_date| due_date.date_string())
                .unwrap_or_default(),
        }
    }

    /// Resets every field to its default.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Sets a field by its form name.
    ///
    /// Accepts `title`, `description`, `status`, `priority` and `due`/`dueDate`.
    /// Returns `false` for an unknown field name.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        let slot = match field {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "status" => &mut self.status,
            "priority" => &mut self.priority,
            "due" | "dueDate" | "due_date" => &mut self.due_date,
            _ => return false,
        };
        *slot = value.into();
        true
    }

    /// Request body for creating a task. An empty due date is omitted.
    #[must_use]
    pub fn to_create_fields(&self) -> CreateTaskFields {
        CreateTaskFields {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status.clone()),
            priority: Some(self.priority.clone()),
            due_date: self.due_date_value(),
        }
    }

    /// Request body for updating a task. An empty due date is omitted.
    #[must_use]
    pub fn to_update_fields(&self) -> UpdateTaskFields {
        UpdateTaskFields {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status.clone()),
            priority: Some(self.priority.clone()),
            due_date: self.due_date_value().map(Some),
        }
    }

    fn due_date_value(&self) -> Option<String> {
        let due_date = self.due_date.trim();
        (!due_date.is_empty()).then(|| due_date.to_string())
    }
}
