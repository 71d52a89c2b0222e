//! Request extraction.
//!
//! Task bodies may arrive as JSON or as URL-encoded form data. Any rejection
//! (bad syntax, wrong types, unsupported content type) becomes a 400 with the
//! failure envelope instead of axum's plain-text rejection. A task id that
//! cannot be read from the path matches no task and becomes a 404.

use axum::{
    Form, Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use serde::de::DeserializeOwned;

use super::error::{ApiErrorResponse, NOT_FOUND_MESSAGE};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body extractor accepting `application/json` or form-encoded data.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskPayload<T>(pub T);

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with(FORM_CONTENT_TYPE))
}

impl<S, T> FromRequest<S> for TaskPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiErrorResponse;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&request) {
            let Form(value) = Form::<T>::from_request(request, state)
                .await
                .map_err(|rejection| ApiErrorResponse::bad_request(rejection.body_text()))?;
            return Ok(Self(value));
        }

        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| ApiErrorResponse::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Task id path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPath(pub String);

impl<S> FromRequestParts<S> for TaskPath
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(%rejection, "Unreadable task id in path");
                ApiErrorResponse::not_found(NOT_FOUND_MESSAGE)
            })?;
        Ok(Self(id))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreateTaskFields, UpdateTaskFields};
    use axum::body::Body;
    use axum::http::StatusCode;
    use rstest::rstest;

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn test_extracts_json() {
        let request = request(Some("application/json"), r#"{"title":"Buy milk"}"#);

        let TaskPayload(fields) = TaskPayload::<CreateTaskFields>::from_request(request, &())
            .await
            .unwrap();

        assert_eq!(fields.title.as_deref(), Some("Buy milk"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_extracts_form() {
        let request = request(
            Some("application/x-www-form-urlencoded"),
            "title=Buy+milk&priority=high&dueDate=",
        );

        let TaskPayload(fields) = TaskPayload::<CreateTaskFields>::from_request(request, &())
            .await
            .unwrap();

        assert_eq!(fields.title.as_deref(), Some("Buy milk"));
        assert_eq!(fields.priority.as_deref(), Some("high"));
        assert_eq!(fields.due_date.as_deref(), Some(""));
    }

    #[rstest]
    #[tokio::test]
    async fn test_form_update_fields() {
        let request = request(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            "status=completed",
        );

        let TaskPayload(fields) = TaskPayload::<UpdateTaskFields>::from_request(request, &())
            .await
            .unwrap();

        assert_eq!(fields.status.as_deref(), Some("completed"));
        assert!(fields.due_date.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_path_without_route_params_is_not_found() {
        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/tasks/abc")
            .body(())
            .unwrap()
            .into_parts();

        let rejection = TaskPath::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        assert_eq!(rejection.status, StatusCode::NOT_FOUND);
        assert_eq!(rejection.body.message.as_deref(), Some(NOT_FOUND_MESSAGE));
    }

    #[rstest]
    #[case(Some("application/json"), "{not json")]
    #[case(Some("application/json"), r#"{"title": 42}"#)]
    #[case(Some("text/plain"), "title=x")]
    #[case(None, r#"{"title":"x"}"#)]
    #[tokio::test]
    async fn test_rejections_become_bad_request(
        #[case] content_type: Option<&str>,
        #[case] body: &'static str,
    ) {
        let request = request(content_type, body);

        let rejection = TaskPayload::<CreateTaskFields>::from_request(request, &())
            .await
            .unwrap_err();

        assert_eq!(rejection.status, StatusCode::BAD_REQUEST);
        assert!(!rejection.body.success);
    }
}
