//! Typed HTTP client for the task endpoints.

use reqwest::{Client, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::api::Envelope;
use crate::config::ClientConfig;
use crate::domain::{CreateTaskFields, Task, TaskId, UpdateTaskFields};

/// Errors returned by [`TaskApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a failure envelope or a non-success status.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// No usable response: connection refused, timeout, or an unreadable body.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A successful response without the expected payload.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Returns `true` if the server produced an answer.
    #[must_use]
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Client for `/tasks` under a configured base URL.
#[derive(Debug, Clone)]
pub struct TaskApiClient {
    client: Client,
    base_url: String,
}

impl TaskApiClient {
    /// Creates a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /tasks`.
    ///
    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn list(&self) -> ClientResult<Vec<Task>> {
        let response = self.client.get(self.url("/tasks")).send().await?;
        require_data(parse_envelope(response).await?)
    }

    /// `GET /tasks/{id}`.
    ///
    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn get(&self, id: &TaskId) -> ClientResult<Task> {
        let response = self
            .client
            .get(self.url(&format!("/tasks/{id}")))
            .send()
            .await?;
        require_data(parse_envelope(response).await?)
    }

    /// `POST /tasks`.
    ///
    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn create(&self, fields: &CreateTaskFields) -> ClientResult<Task> {
        self.send_json(self.client.post(self.url("/tasks")), fields)
            .await
    }

    /// `PUT /tasks/{id}`.
    ///
    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn update(&self, id: &TaskId, fields: &UpdateTaskFields) -> ClientResult<Task> {
        self.send_json(self.client.put(self.url(&format!("/tasks/{id}"))), fields)
            .await
    }

    /// `DELETE /tasks/{id}`. Returns the server's confirmation message.
    ///
    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn delete(&self, id: &TaskId) -> ClientResult<String> {
        let response = self
            .client
            .delete(self.url(&format!("/tasks/{id}")))
            .send()
            .await?;
        let envelope: Envelope<serde_json::Value> = parse_envelope(response).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        request: reqwest::RequestBuilder,
        body: &B,
    ) -> ClientResult<Task> {
        let response = request.json(body).send().await?;
        require_data(parse_envelope(response).await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Decodes the envelope, turning failure envelopes into `ClientError::Api`.
async fn parse_envelope<T: DeserializeOwned>(response: Response) -> ClientResult<Envelope<T>> {
    let status = response.status();
    let body = response.bytes().await?;

    match serde_json::from_slice::<Envelope<T>>(&body) {
        Ok(envelope) if envelope.success && status.is_success() => Ok(envelope),
        Ok(envelope) => Err(ClientError::Api {
            status,
            message: envelope
                .message
                .unwrap_or_else(|| fallback_message(status)),
        }),
        Err(_) if !status.is_success() => Err(ClientError::Api {
            status,
            message: fallback_message(status),
        }),
        Err(error) => Err(ClientError::InvalidResponse(error.to_string())),
    }
}

fn require_data<T>(envelope: Envelope<T>) -> ClientResult<T> {
    envelope
        .data
        .ok_or_else(|| ClientError::InvalidResponse("response carried no data".to_string()))
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    fn unreachable_client() -> TaskApiClient {
        let config =
            ClientConfig::new("http://127.0.0.1:1/api").with_timeout(Duration::from_secs(2));
        TaskApiClient::new(&config).unwrap()
    }

    #[rstest]
    fn test_url_joins_base_and_path() {
        let client = unreachable_client();

        assert_eq!(client.url("/tasks"), "http://127.0.0.1:1/api/tasks");
    }

    #[rstest]
    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let error = unreachable_client().list().await.unwrap_err();

        assert!(matches!(error, ClientError::Transport(_)));
        assert!(!error.is_api());
    }

    #[rstest]
    fn test_api_error_displays_server_message() {
        let error = ClientError::Api {
            status: StatusCode::NOT_FOUND,
            message: "Task not found".to_string(),
        };

        assert_eq!(error.to_string(), "Task not found");
        assert!(error.is_api());
    }

    #[rstest]
    #[case(StatusCode::NOT_FOUND, "Not Found")]
    #[case(StatusCode::BAD_GATEWAY, "Bad Gateway")]
    fn test_fallback_message_uses_reason(#[case] status: StatusCode, #[case] expected: &str) {
        assert_eq!(fallback_message(status), expected);
    }

    #[rstest]
    fn test_require_data_rejects_empty_envelope() {
        let envelope: Envelope<Task> = Envelope::message("ok");

        assert!(matches!(
            require_data(envelope),
            Err(ClientError::InvalidResponse(_))
        ));
    }
}
