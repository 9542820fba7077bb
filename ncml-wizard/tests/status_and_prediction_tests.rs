//! Training status polling, model info and prediction requests

mod helpers;

use helpers::mock_service::{MockOptions, MockService, Reply};
use ncml_common::api::TrainingStatus;
use ncml_common::events::{EventBus, WizardEvent};
use ncml_common::TaskType;
use ncml_wizard::services::{
    prepare_prediction, HttpPredictionClient, HttpTrainingClient, PredictionService,
    StatusPoller, TrainingService,
};
use ncml_wizard::WizardError;
use std::collections::BTreeMap;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);
const POLL: Duration = Duration::from_millis(20);

async fn start(options: MockOptions) -> (MockService, HttpTrainingClient) {
    let mock = MockService::start(options).await;
    let client = HttpTrainingClient::new(mock.client_config(TIMEOUT)).unwrap();
    (mock, client)
}

fn inputs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_polling_stops_when_ready() {
    let (mock, client) = start(MockOptions {
        statuses: vec!["training", "training", "ready"],
        ..MockOptions::default()
    })
    .await;
    let bus = EventBus::new(16);
    let mut rx = bus.subscribe();

    let status = StatusPoller::new(&client, POLL)
        .with_max_wait(Duration::from_secs(5))
        .with_events(bus)
        .wait_until_ready("t-123")
        .await
        .unwrap();

    assert_eq!(status.status, TrainingStatus::Ready);
    assert_eq!(mock.status_calls(), 3);

    // One event per distinct status
    let mut statuses = Vec::new();
    while let Ok(WizardEvent::TrainingStatusChanged { status, .. }) = rx.try_recv() {
        statuses.push(status);
    }
    assert_eq!(statuses, vec![TrainingStatus::Training, TrainingStatus::Ready]);
}

#[tokio::test]
async fn test_polling_reports_failed_training() {
    let (_mock, client) = start(MockOptions {
        statuses: vec!["training", "failed"],
        ..MockOptions::default()
    })
    .await;

    let err = StatusPoller::new(&client, POLL)
        .wait_until_ready("t-123")
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::TrainingFailed));
    assert_eq!(
        err.to_string(),
        "Model training failed. Please try again with a different dataset or configuration."
    );
}

#[tokio::test]
async fn test_polling_gives_up_after_max_wait() {
    let (_mock, client) = start(MockOptions {
        statuses: vec!["training"],
        ..MockOptions::default()
    })
    .await;

    let err = StatusPoller::new(&client, POLL)
        .with_max_wait(Duration::from_millis(100))
        .wait_until_ready("t-123")
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::Timeout(_)));
}

#[tokio::test]
async fn test_model_info() {
    let (_mock, client) = start(MockOptions::default()).await;

    let info = client.model_info("m-1").await.unwrap();
    assert_eq!(info.id, "m-1");
    assert_eq!(info.model_type, Some(TaskType::Classification));
    assert_eq!(info.features, vec!["tenure", "charges"]);
    assert_eq!(info.accuracy, Some(0.91));
}

#[tokio::test]
async fn test_model_not_found_and_generic_failure() {
    let (_mock, client) = start(MockOptions::default()).await;

    let err = client.model_info("missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Model not found");

    let err = client.model_info("broken").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch model information");
}

#[tokio::test]
async fn test_prediction_round_trip() {
    let (mock, client) = start(MockOptions::default()).await;
    let predictor = HttpPredictionClient::new(mock.client_config(TIMEOUT)).unwrap();

    let model = client.model_info("m-1").await.unwrap();
    let request = prepare_prediction(&model, &inputs(&[("tenure", "12"), ("charges", "70.5")])).unwrap();
    let result = predictor.predict(&request).await.unwrap();

    assert_eq!(result.prediction, "Churn");
    assert!(result.class_probabilities.unwrap().contains_key("No Churn"));

    let sent = mock.predictions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["model_id"], "m-1");
    assert_eq!(sent[0]["features"]["tenure"], "12");
}

#[tokio::test]
async fn test_missing_inputs_block_prediction() {
    let (mock, client) = start(MockOptions::default()).await;

    let model = client.model_info("m-1").await.unwrap();
    let err = prepare_prediction(&model, &inputs(&[("tenure", "12")])).unwrap_err();
    assert_eq!(err.to_string(), "Please fill in all required inputs: charges");
    assert!(mock.predictions().is_empty());
}

#[tokio::test]
async fn test_prediction_errors_use_detail_or_fallback() {
    let (mock, client) = start(MockOptions {
        predict: Reply::detail(400, "charges must be numeric"),
        ..MockOptions::default()
    })
    .await;
    let predictor = HttpPredictionClient::new(mock.client_config(TIMEOUT)).unwrap();
    let model = client.model_info("m-1").await.unwrap();
    let request = prepare_prediction(&model, &inputs(&[("tenure", "1"), ("charges", "x")])).unwrap();

    let err = predictor.predict(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "charges must be numeric");

    let (mock, _client) = start(MockOptions {
        predict: Reply::Text(500, "oops".to_string()),
        ..MockOptions::default()
    })
    .await;
    let predictor = HttpPredictionClient::new(mock.client_config(TIMEOUT)).unwrap();
    let err = predictor.predict(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to make prediction");
}
