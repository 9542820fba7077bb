//! Shared API request/response types

use crate::TaskType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ========================================
// Training Submission
// ========================================

/// Successful response from `POST /send_training`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TrainingResponse {
    /// Server-issued identifier of the training job, when provided
    #[serde(default)]
    pub training_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body returned by the service on non-2xx responses
///
/// `detail` is usually a string, but validation failures carry a list of
/// `{ "loc": [...], "msg": "..." }` objects.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Human-readable message extracted from `detail`
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::String(_) | Value::Null => None,
            Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(obj) => obj
                            .get("msg")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        _ => None,
                    })
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            other => Some(other.to_string()),
        }
    }

    /// Parse a raw response body; anything that is not JSON yields `None`
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message())
    }
}

// ========================================
// Training Status / Model Info
// ========================================

/// Lifecycle of a training job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    Training,
    Ready,
    Failed,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

impl TrainingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Training => "training",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Response from `GET /training_status/{id}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainingStatusResponse {
    pub status: TrainingStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response from `GET /model/{id}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelInfo {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Task the model was trained for
    #[serde(rename = "type", default)]
    pub model_type: Option<TaskType>,

    #[serde(default)]
    pub status: Option<TrainingStatus>,

    #[serde(default)]
    pub target: Option<String>,

    /// Input features expected by the prediction endpoint
    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub accuracy: Option<f64>,

    #[serde(default)]
    pub categorical_features: Vec<String>,

    #[serde(default)]
    pub numerical_features: Vec<String>,

    /// Allowed values per categorical feature
    #[serde(default)]
    pub categorical_options: BTreeMap<String, Vec<String>>,
}

// ========================================
// Prediction
// ========================================

/// Request body for the prediction endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictionRequest {
    pub model_id: String,
    pub features: BTreeMap<String, String>,
}

/// Prediction returned by the service
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictionResult {
    /// Predicted class or value (shape depends on the model)
    pub prediction: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_probabilities: Option<BTreeMap<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_string_detail() {
        assert_eq!(
            ErrorBody::message_from_body(r#"{"detail":"bad column"}"#),
            Some("bad column".to_string())
        );
    }

    #[test]
    fn test_error_body_validation_list() {
        let body = r#"{"detail":[{"loc":["body","file"],"msg":"field required"},{"msg":"bad split"}]}"#;
        assert_eq!(
            ErrorBody::message_from_body(body),
            Some("field required; bad split".to_string())
        );
    }

    #[test]
    fn test_error_body_missing_or_not_json() {
        assert_eq!(ErrorBody::message_from_body("{}"), None);
        assert_eq!(ErrorBody::message_from_body(r#"{"detail":""}"#), None);
        assert_eq!(ErrorBody::message_from_body("<html>502</html>"), None);
    }

    #[test]
    fn test_training_response_without_id() {
        let resp: TrainingResponse = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert_eq!(resp.training_id, None);
    }

    #[test]
    fn test_unknown_training_status() {
        let resp: TrainingStatusResponse =
            serde_json::from_str(r#"{"status":"preprocessing"}"#).unwrap();
        assert_eq!(resp.status, TrainingStatus::Unknown);
        assert!(!resp.status.is_terminal());
    }

    #[test]
    fn test_model_info_minimal() {
        let info: ModelInfo =
            serde_json::from_str(r#"{"id":"m1","type":"classification","features":["a"]}"#)
                .unwrap();
        assert_eq!(info.model_type, Some(TaskType::Classification));
        assert_eq!(info.features, vec!["a".to_string()]);
        assert!(info.categorical_options.is_empty());
    }
}
