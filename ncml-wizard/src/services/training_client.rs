//! Training service client
//!
//! `POST /send_training` (multipart), `GET /training_status/{id}` and
//! `GET /model/{id}`. No request is retried automatically.

use crate::error::{WizardError, WizardResult};
use crate::models::SubmissionPayload;
use crate::services::http::{build_client, check_status, classify, ServiceError};
use async_trait::async_trait;
use ncml_common::api::{ModelInfo, TrainingResponse, TrainingStatusResponse};
use ncml_common::config::ClientConfig;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const TRAINING_FAILED: &str = "Failed to train model";
pub const MODEL_NOT_FOUND: &str = "Model not found";
pub const MODEL_FETCH_FAILED: &str = "Failed to fetch model information";
const STATUS_FETCH_FAILED: &str = "Failed to fetch training status";

/// Remote training backend
#[async_trait]
pub trait TrainingService: Send + Sync {
    /// Send one training request
    async fn submit(&self, payload: &SubmissionPayload) -> WizardResult<TrainingResponse>;

    async fn training_status(&self, training_id: &str) -> WizardResult<TrainingStatusResponse>;

    async fn model_info(&self, model_id: &str) -> WizardResult<ModelInfo>;
}

/// HTTP implementation of [`TrainingService`]
pub struct HttpTrainingClient {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTrainingClient {
    pub fn new(config: ClientConfig) -> WizardResult<Self> {
        let http_client = build_client(config.request_timeout)
            .map_err(|e| e.into_wizard("Failed to create HTTP client"))?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.config.request_timeout
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ServiceError> {
        let timeout = self.timeout();
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;
        let response = check_status(response, timeout).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TrainingService for HttpTrainingClient {
    async fn submit(&self, payload: &SubmissionPayload) -> WizardResult<TrainingResponse> {
        let url = self.config.training_url();
        let timeout = self.timeout();
        let form = payload.to_form()?;

        debug!(
            url = %url,
            filename = %payload.filename,
            target = %payload.target_column,
            task_type = %payload.task_type,
            "Sending training request"
        );

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify(e, timeout).into_wizard(TRAINING_FAILED))?;
        let response = check_status(response, timeout)
            .await
            .map_err(|e| e.into_wizard(TRAINING_FAILED))?;

        // The body is informational; a 2xx without JSON still counts as accepted
        let body = response
            .text()
            .await
            .map_err(|e| classify(e, timeout).into_wizard(TRAINING_FAILED))?;
        let accepted = if body.trim().is_empty() {
            TrainingResponse::default()
        } else {
            serde_json::from_str::<TrainingResponse>(&body).unwrap_or_else(|e| {
                warn!(error = %e, "Training response is not the expected JSON");
                TrainingResponse::default()
            })
        };

        info!(
            training_id = accepted.training_id.as_deref().unwrap_or("-"),
            project = %payload.project_name,
            "Training request accepted"
        );
        Ok(accepted)
    }

    async fn training_status(&self, training_id: &str) -> WizardResult<TrainingStatusResponse> {
        let url = self.config.status_url(training_id)?;
        let status: TrainingStatusResponse = self
            .get_json(&url)
            .await
            .map_err(|e| e.into_wizard(STATUS_FETCH_FAILED))?;
        debug!(training_id = %training_id, status = %status.status, "Training status");
        Ok(status)
    }

    async fn model_info(&self, model_id: &str) -> WizardResult<ModelInfo> {
        let url = self.config.model_url(model_id)?;
        match self.get_json::<ModelInfo>(&url).await {
            Ok(info) => Ok(info),
            Err(ServiceError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(WizardError::Server {
                    status,
                    message: MODEL_NOT_FOUND.to_string(),
                })
            }
            Err(e) => Err(e.into_wizard(MODEL_FETCH_FAILED)),
        }
    }
}
