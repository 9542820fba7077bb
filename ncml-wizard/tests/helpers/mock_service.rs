//! In-process training service
//!
//! Records every request it receives and answers with scripted replies.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ncml_common::config::ClientConfig;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted answer for a POST endpoint
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, Value),
    /// Plain-text body (e.g. a proxy error page)
    Text(u16, String),
    /// Wait this long before answering 200
    Slow(Duration),
}

impl Reply {
    pub fn accepted(training_id: &str) -> Self {
        Self::Json(200, json!({ "training_id": training_id, "status": "queued" }))
    }

    pub fn detail(status: u16, detail: &str) -> Self {
        Self::Json(status, json!({ "detail": detail }))
    }

    async fn respond(&self) -> Response {
        match self {
            Self::Json(status, body) => (code(*status), Json(body.clone())).into_response(),
            Self::Text(status, body) => (code(*status), body.clone()).into_response(),
            Self::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                (StatusCode::OK, Json(json!({ "training_id": "late" }))).into_response()
            }
        }
    }
}

fn code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// One multipart training request as received
#[derive(Debug, Clone, Default)]
pub struct CapturedSubmission {
    /// Text fields by name
    pub fields: BTreeMap<String, String>,
    pub file_name: Option<String>,
    pub file_content_type: Option<String>,
    pub file_bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MockOptions {
    pub submit: Reply,
    /// Statuses returned by successive status checks; the last one repeats
    pub statuses: Vec<&'static str>,
    pub predict: Reply,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            submit: Reply::accepted("t-123"),
            statuses: vec!["ready"],
            predict: Reply::Json(
                200,
                json!({
                    "prediction": "Churn",
                    "confidence": 0.82,
                    "class_probabilities": { "Churn": 0.82, "No Churn": 0.18 }
                }),
            ),
        }
    }
}

#[derive(Clone)]
struct MockState {
    options: Arc<MockOptions>,
    submissions: Arc<Mutex<Vec<CapturedSubmission>>>,
    predictions: Arc<Mutex<Vec<Value>>>,
    status_calls: Arc<AtomicUsize>,
}

/// Running mock service
pub struct MockService {
    pub base_url: String,
    state: MockState,
}

impl MockService {
    pub async fn start(options: MockOptions) -> Self {
        let state = MockState {
            options: Arc::new(options),
            submissions: Arc::new(Mutex::new(Vec::new())),
            predictions: Arc::new(Mutex::new(Vec::new())),
            status_calls: Arc::new(AtomicUsize::new(0)),
        };

        let app = Router::new()
            .route("/send_training", post(send_training))
            .route("/training_status/:id", get(training_status))
            .route("/model/:id", get(model))
            .route("/predict", post(predict))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock service");
        let addr = listener.local_addr().expect("mock service address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock service");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Client configuration pointing at this service
    pub fn client_config(&self, timeout: Duration) -> ClientConfig {
        ClientConfig {
            service_url: self.base_url.clone(),
            request_timeout: timeout,
            status_poll_interval: Duration::from_millis(20),
            ..ClientConfig::default()
        }
    }

    pub fn submissions(&self) -> Vec<CapturedSubmission> {
        self.state.submissions.lock().unwrap().clone()
    }

    pub fn predictions(&self) -> Vec<Value> {
        self.state.predictions.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> usize {
        self.state.status_calls.load(Ordering::SeqCst)
    }
}

async fn send_training(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    let mut captured = CapturedSubmission::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            captured.file_name = field.file_name().map(str::to_string);
            captured.file_content_type = field.content_type().map(str::to_string);
            captured.file_bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        } else {
            let value = field.text().await.unwrap_or_default();
            captured.fields.insert(name, value);
        }
    }
    state.submissions.lock().unwrap().push(captured);

    state.options.submit.respond().await
}

async fn training_status(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    let call = state.status_calls.fetch_add(1, Ordering::SeqCst);
    let statuses = &state.options.statuses;
    let status = statuses
        .get(call)
        .or_else(|| statuses.last())
        .copied()
        .unwrap_or("training");
    Json(json!({ "status": status, "training_id": id })).into_response()
}

async fn model(Path(id): Path<String>) -> Response {
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "no such model" }))).into_response();
    }
    if id == "broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream failure").into_response();
    }
    Json(json!({
        "id": id,
        "name": "Churn",
        "type": "classification",
        "status": "ready",
        "target": "churned",
        "features": ["tenure", "charges"],
        "accuracy": 0.91
    }))
    .into_response()
}

async fn predict(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.predictions.lock().unwrap().push(body);
    state.options.predict.respond().await
}
