use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_NOTIFY_URL: &str = "https://notify-api.line.me/api/notify";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status code is not 200 but {status}{}", detail(.message))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({m})"))
        .unwrap_or_default()
}

/// Error body returned by the notify API, e.g. `{"status":401,"message":"Invalid access token"}`.
#[derive(Debug, Deserialize)]
struct NotifyResponse {
    message: String,
}

#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl Notifier {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub async fn send(&self, message: &str, token: &str) -> Result<(), NotifyError> {
        debug!(endpoint = %self.endpoint, len = message.len(), "sending notification");
        let response = self
            .client
            .post(self.endpoint.as_str())
            .bearer_auth(token)
            .form(&[("message", message)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<NotifyResponse>(&body)
            .map(|body| body.message)
            .map_err(|err| warn!(error = %err, "notify error body was not JSON"))
            .ok();
        Err(NotifyError::Status { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = NotifyError::Status {
            status: StatusCode::UNAUTHORIZED,
            message: Some("Invalid access token".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "status code is not 200 but 401 Unauthorized (Invalid access token)"
        );

        let err = NotifyError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(
            err.to_string(),
            "status code is not 200 but 500 Internal Server Error"
        );
    }
}
