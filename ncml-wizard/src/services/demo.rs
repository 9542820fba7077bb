//! Canned training backend for demonstrations
//!
//! Only used when `demo_mode` is switched on; live clients never fall back
//! to it.

use crate::error::{WizardError, WizardResult};
use crate::models::SubmissionPayload;
use crate::services::{PredictionService, TrainingService};
use async_trait::async_trait;
use chrono::Utc;
use ncml_common::api::{
    ModelInfo, PredictionRequest, PredictionResult, TrainingResponse, TrainingStatus,
    TrainingStatusResponse,
};
use ncml_common::TaskType;
use serde_json::{json, Value};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

const CHURN_CLASSES: [&str; 2] = ["No Churn", "Churn"];

#[derive(Debug, Default)]
pub struct DemoTrainingService;

impl DemoTrainingService {
    pub fn new() -> Self {
        Self
    }

    /// Fixed customer-churn model description
    pub fn churn_model(model_id: &str) -> ModelInfo {
        let mut categorical_options = BTreeMap::new();
        categorical_options.insert(
            "contract".to_string(),
            vec!["Month-to-month".into(), "One year".into(), "Two year".into()],
        );
        categorical_options.insert(
            "payment_method".to_string(),
            vec![
                "Electronic check".into(),
                "Mailed check".into(),
                "Bank transfer".into(),
                "Credit card".into(),
            ],
        );

        ModelInfo {
            id: model_id.to_string(),
            name: Some("Customer Churn Predictor".to_string()),
            model_type: Some(TaskType::Classification),
            status: Some(TrainingStatus::Ready),
            target: Some("churn".to_string()),
            features: vec![
                "tenure".into(),
                "monthly_charges".into(),
                "total_charges".into(),
                "contract".into(),
                "payment_method".into(),
            ],
            accuracy: Some(0.87),
            categorical_features: vec!["contract".into(), "payment_method".into()],
            numerical_features: vec![
                "tenure".into(),
                "monthly_charges".into(),
                "total_charges".into(),
            ],
            categorical_options,
        }
    }
}

#[async_trait]
impl TrainingService for DemoTrainingService {
    async fn submit(&self, payload: &SubmissionPayload) -> WizardResult<TrainingResponse> {
        let training_id = format!("demo-{}", Uuid::new_v4());
        tracing::info!(training_id = %training_id, project = %payload.project_name, "Demo training accepted");
        Ok(TrainingResponse {
            training_id: Some(training_id),
            message: Some("Demo mode: no model was trained".to_string()),
        })
    }

    async fn training_status(&self, _training_id: &str) -> WizardResult<TrainingStatusResponse> {
        Ok(TrainingStatusResponse {
            status: TrainingStatus::Ready,
            progress: Some(100.0),
            message: None,
        })
    }

    async fn model_info(&self, model_id: &str) -> WizardResult<ModelInfo> {
        if model_id.trim().is_empty() {
            return Err(WizardError::Validation("Model id is required".to_string()));
        }
        Ok(Self::churn_model(model_id))
    }
}

#[async_trait]
impl PredictionService for DemoTrainingService {
    async fn predict(&self, request: &PredictionRequest) -> WizardResult<PredictionResult> {
        // Same inputs always give the same answer
        let mut hasher = DefaultHasher::new();
        request.model_id.hash(&mut hasher);
        request.features.hash(&mut hasher);
        let seed = hasher.finish();

        let churn_probability = 0.05 + (seed % 900) as f64 / 1000.0;
        let predicted = if churn_probability >= 0.5 {
            CHURN_CLASSES[1]
        } else {
            CHURN_CLASSES[0]
        };
        let confidence = churn_probability.max(1.0 - churn_probability);

        let mut class_probabilities = BTreeMap::new();
        class_probabilities.insert(CHURN_CLASSES[0].to_string(), round3(1.0 - churn_probability));
        class_probabilities.insert(CHURN_CLASSES[1].to_string(), round3(churn_probability));

        Ok(PredictionResult {
            prediction: Value::String(predicted.to_string()),
            confidence: Some(round3(confidence)),
            class_probabilities: Some(class_probabilities),
            prediction_time: Some(Utc::now().to_rfc3339()),
        })
    }
}

fn round3(value: f64) -> Value {
    json!((value * 1000.0).round() / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_status_is_ready() {
        let service = DemoTrainingService::new();
        let status = service.training_status("anything").await.unwrap();
        assert_eq!(status.status, TrainingStatus::Ready);
    }

    #[tokio::test]
    async fn test_prediction_is_deterministic() {
        let service = DemoTrainingService::new();
        let mut features = BTreeMap::new();
        features.insert("tenure".to_string(), "12".to_string());
        let request = PredictionRequest {
            model_id: "m1".to_string(),
            features,
        };

        let first = service.predict(&request).await.unwrap();
        let second = service.predict(&request).await.unwrap();
        assert_eq!(first.prediction, second.prediction);
        assert_eq!(first.class_probabilities, second.class_probabilities);
        assert!(CHURN_CLASSES.contains(&first.prediction.as_str().unwrap()));
    }

    #[tokio::test]
    async fn test_model_info_echoes_id() {
        let info = DemoTrainingService::new().model_info("abc").await.unwrap();
        assert_eq!(info.id, "abc");
        assert_eq!(info.model_type, Some(TaskType::Classification));
        assert_eq!(info.features.len(), 5);
    }
}
