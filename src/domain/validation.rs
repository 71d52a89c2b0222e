//! Input validation for task fields.
//!
//! Raw request fields arrive as optional strings (JSON or form encoded) and
//! are checked here, field by field, before anything reaches the repository.
//! Every offending field is reported, not only the first one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::task::{Priority, TaskChanges, TaskDraft, TaskStatus, Timestamp};

// =============================================================================
// Errors
// =============================================================================

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation (wire name).
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation failure carrying every offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field-level errors, in field order.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Creates a validation error with a single field error.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    /// Human-readable summary: the field messages joined by `"; "`.
    #[must_use]
    pub fn message(&self) -> String {
        if self.errors.is_empty() {
            return "Validation failed".to_string();
        }
        self.errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Returns `true` if the named field has an error.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

// =============================================================================
// Field validators
// =============================================================================

/// Validates a task title.
///
/// # Errors
///
/// Fails if the trimmed title is empty.
pub fn validate_title(title: &str) -> Result<String, FieldError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(FieldError::new("title", "Title is required"));
    }

    Ok(title.to_string())
}

/// Trims a task description. Empty is allowed.
#[must_use]
pub fn normalize_description(description: &str) -> String {
    description.trim().to_string()
}

/// Parses a status value.
///
/// # Errors
///
/// Fails unless the value is one of `pending`, `in-progress`, `completed`.
pub fn parse_status(value: &str) -> Result<TaskStatus, FieldError> {
    value.trim().parse().map_err(|_| {
        FieldError::new(
            "status",
            format!(
                "'{}' is not a valid status (expected one of: {})",
                value.trim(),
                join_variants(&TaskStatus::ALL.map(TaskStatus::as_str))
            ),
        )
    })
}

/// Parses a priority value.
///
/// # Errors
///
/// Fails unless the value is one of `low`, `medium`, `high`.
pub fn parse_priority(value: &str) -> Result<Priority, FieldError> {
    value.trim().parse().map_err(|_| {
        FieldError::new(
            "priority",
            format!(
                "'{}' is not a valid priority (expected one of: {})",
                value.trim(),
                join_variants(&Priority::ALL.map(Priority::as_str))
            ),
        )
    })
}

/// Parses a due date given as `YYYY-MM-DD` (midnight UTC) or RFC 3339.
///
/// An empty value means "no due date".
///
/// # Errors
///
/// Fails if the value is neither format.
pub fn parse_due_date(value: &str) -> Result<Option<Timestamp>, FieldError> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(Timestamp::from_datetime(
            datetime.with_timezone(&Utc),
        )));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| Some(Timestamp::from_datetime(datetime.and_utc())))
        .ok_or_else(|| {
            FieldError::new(
                "dueDate",
                format!("'{value}' is not a valid date (expected YYYY-MM-DD or RFC 3339)"),
            )
        })
}

fn join_variants(variants: &[&str]) -> String {
    variants.join(", ")
}

/// Treats empty or whitespace-only values as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn collect<T>(result: Result<T, FieldError>, errors: &mut Vec<FieldError>) -> Option<T> {
    result.map_err(|error| errors.push(error)).ok()
}

// =============================================================================
// Raw input records
// =============================================================================

/// Unvalidated fields for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl CreateTaskFields {
    /// Creates input with only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Validates the fields and applies defaults for the missing ones.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn validate(&self) -> Result<TaskDraft, ValidationError> {
        let mut errors = Vec::new();

        let title = collect(
            validate_title(self.title.as_deref().unwrap_or_default()),
            &mut errors,
        );
        let description = normalize_description(self.description.as_deref().unwrap_or_default());
        let status = collect(
            present(self.status.as_deref()).map_or(Ok(TaskStatus::default()), parse_status),
            &mut errors,
        );
        let priority = collect(
            present(self.priority.as_deref()).map_or(Ok(Priority::default()), parse_priority),
            &mut errors,
        );
        let due_date = collect(
            self.due_date.as_deref().map_or(Ok(None), parse_due_date),
            &mut errors,
        );

        match (title, status, priority, due_date) {
            (Some(title), Some(status), Some(priority), Some(due_date)) if errors.is_empty() => {
                Ok(TaskDraft {
                    title,
                    description,
                    status,
                    priority,
                    due_date,
                })
            }
            _ => Err(ValidationError::new(errors)),
        }
    }
}

/// Unvalidated fields for a partial update.
///
/// Absent fields are left unchanged. `dueDate: null` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<String>>,
}

impl UpdateTaskFields {
    /// Validates the provided fields.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn validate(&self) -> Result<TaskChanges, ValidationError> {
        let mut errors = Vec::new();

        let title = collect(
            self.title.as_deref().map(validate_title).transpose(),
            &mut errors,
        );
        let description = self.description.as_deref().map(normalize_description);
        let status = collect(
            present(self.status.as_deref()).map(parse_status).transpose(),
            &mut errors,
        );
        let priority = collect(
            present(self.priority.as_deref())
                .map(parse_priority)
                .transpose(),
            &mut errors,
        );
        let due_date = collect(
            match &self.due_date {
                None => Ok(None),
                Some(None) => Ok(Some(None)),
                Some(Some(value)) if value.trim().is_empty() => Ok(None),
                Some(Some(value)) => parse_due_date(value).map(Some),
            },
            &mut errors,
        );

        match (title, status, priority, due_date) {
            (Some(title), Some(status), Some(priority), Some(due_date)) if errors.is_empty() => {
                Ok(TaskChanges {
                    title,
                    description,
                    status,
                    priority,
                    due_date,
                })
            }
            _ => Err(ValidationError::new(errors)),
        }
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Tests
// =============================================================================
