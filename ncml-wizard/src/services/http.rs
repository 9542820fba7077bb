//! HTTP plumbing shared by the training and prediction clients

use crate::error::WizardError;
use ncml_common::api::ErrorBody;
use reqwest::{Client, Response};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("ncml/", env!("CARGO_PKG_VERSION"));

/// Transport-level client errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-2xx status; `detail` from the body when there was one
    #[error("API error {status}")]
    Api { status: u16, detail: Option<String> },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ServiceError {
    /// Map into the wizard taxonomy, using `fallback` when the service gave no detail
    pub fn into_wizard(self, fallback: &str) -> WizardError {
        match self {
            Self::Network(msg) => WizardError::Network(msg),
            Self::Timeout(after) => WizardError::Timeout(after),
            Self::Api { status, detail } => WizardError::Server {
                status,
                message: detail.unwrap_or_else(|| fallback.to_string()),
            },
            Self::Parse(msg) => WizardError::Network(format!("unexpected response: {}", msg)),
        }
    }
}

/// Build a client with the caller-side timeout applied to every request
pub fn build_client(timeout: Duration) -> Result<Client, ServiceError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::Network(e.to_string()))
}

/// Classify a send/receive failure
pub fn classify(err: reqwest::Error, timeout: Duration) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(timeout)
    } else {
        ServiceError::Network(err.to_string())
    }
}

/// Pass 2xx responses through; turn anything else into [`ServiceError::Api`]
pub async fn check_status(response: Response, timeout: Duration) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.map_err(|e| classify(e, timeout))?;
    let detail = ErrorBody::message_from_body(&body);
    tracing::debug!(status = status.as_u16(), detail = ?detail, "Service returned error status");
    Err(ServiceError::Api {
        status: status.as_u16(),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_uses_detail_or_fallback() {
        let with_detail = ServiceError::Api {
            status: 500,
            detail: Some("bad column".to_string()),
        };
        assert_eq!(with_detail.into_wizard("Failed to train model").to_string(), "bad column");

        let without = ServiceError::Api {
            status: 502,
            detail: None,
        };
        match without.into_wizard("Failed to train model") {
            WizardError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Failed to train model");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_client_creation() {
        assert!(build_client(Duration::from_secs(30)).is_ok());
    }
}
