//! Domain module for task management.
//!
//! This module contains the task entity, its value objects, and the typed
//! validation that turns raw input fields into domain changes.

pub mod task;
pub mod validation;

pub use task::{Priority, Task, TaskChanges, TaskDraft, TaskId, TaskStatus, Timestamp};
pub use validation::{
    CreateTaskFields, FieldError, UpdateTaskFields, ValidationError, normalize_description,
    parse_due_date, parse_priority, parse_status, validate_title,
};
