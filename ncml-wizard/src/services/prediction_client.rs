//! Prediction requests against a trained model

use crate::error::{WizardError, WizardResult};
use crate::services::http::{build_client, check_status, classify, ServiceError};
use async_trait::async_trait;
use ncml_common::api::{ModelInfo, PredictionRequest, PredictionResult};
use ncml_common::config::ClientConfig;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const PREDICTION_FAILED: &str = "Failed to make prediction";

#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> WizardResult<PredictionResult>;
}

/// Build a request for `model`, requiring a non-empty value for every feature
///
/// Inputs for names the model does not use are dropped.
pub fn prepare_prediction(
    model: &ModelInfo,
    inputs: &BTreeMap<String, String>,
) -> WizardResult<PredictionRequest> {
    let missing: Vec<&str> = model
        .features
        .iter()
        .filter(|f| inputs.get(*f).map_or(true, |v| v.trim().is_empty()))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        return Err(WizardError::Validation(format!(
            "Please fill in all required inputs: {}",
            missing.join(", ")
        )));
    }

    let features = model
        .features
        .iter()
        .filter_map(|f| inputs.get(f).map(|v| (f.clone(), v.trim().to_string())))
        .collect();

    Ok(PredictionRequest {
        model_id: model.id.clone(),
        features,
    })
}

/// HTTP implementation of [`PredictionService`]
pub struct HttpPredictionClient {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl HttpPredictionClient {
    pub fn new(config: ClientConfig) -> WizardResult<Self> {
        let http_client = build_client(config.request_timeout)
            .map_err(|e| e.into_wizard("Failed to create HTTP client"))?;
        Ok(Self {
            http_client,
            config,
        })
    }

    async fn post(&self, request: &PredictionRequest) -> Result<PredictionResult, ServiceError> {
        let timeout = self.config.request_timeout;
        let response = self
            .http_client
            .post(self.config.prediction_url())
            .json(request)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;
        let response = check_status(response, timeout).await?;
        response
            .json::<PredictionResult>()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, request: &PredictionRequest) -> WizardResult<PredictionResult> {
        debug!(model_id = %request.model_id, inputs = request.features.len(), "Requesting prediction");
        let result = self
            .post(request)
            .await
            .map_err(|e| e.into_wizard(PREDICTION_FAILED))?;
        info!(model_id = %request.model_id, prediction = %result.prediction, "Prediction received");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ModelInfo {
        serde_json::from_str(r#"{"id":"m1","features":["tenure","charges","contract"]}"#).unwrap()
    }

    #[test]
    fn test_missing_inputs_listed_in_model_order() {
        let mut inputs = BTreeMap::new();
        inputs.insert("charges".to_string(), "70.5".to_string());
        inputs.insert("contract".to_string(), "  ".to_string());

        let err = prepare_prediction(&model(), &inputs).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in all required inputs: tenure, contract"
        );
    }

    #[test]
    fn test_extra_inputs_dropped() {
        let inputs: BTreeMap<String, String> = [
            ("tenure", "12"),
            ("charges", " 70.5 "),
            ("contract", "monthly"),
            ("unused", "x"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let request = prepare_prediction(&model(), &inputs).unwrap();
        assert_eq!(request.model_id, "m1");
        assert_eq!(request.features.len(), 3);
        assert_eq!(request.features["charges"], "70.5");
        assert!(!request.features.contains_key("unused"));
    }
}
