//! Service modules for the wizard workflow
//!
//! - Dataset parsing
//! - Training and prediction clients (HTTP and demo)
//! - Training status polling

pub mod dataset_parser;
pub mod demo;
pub mod http;
pub mod prediction_client;
pub mod status_poller;
pub mod training_client;

pub use dataset_parser::{parse_dataset, parse_dataset_blocking, PREVIEW_ROWS};
pub use demo::DemoTrainingService;
pub use http::ServiceError;
pub use prediction_client::{prepare_prediction, HttpPredictionClient, PredictionService};
pub use status_poller::StatusPoller;
pub use training_client::{HttpTrainingClient, TrainingService};

use crate::error::WizardResult;
use ncml_common::config::ClientConfig;
use std::sync::Arc;

/// Training and prediction backends selected by configuration
#[derive(Clone)]
pub struct Backends {
    pub training: Arc<dyn TrainingService>,
    pub prediction: Arc<dyn PredictionService>,
    pub demo: bool,
}

impl Backends {
    /// HTTP clients, or the canned demo service when `demo_mode` is on
    pub fn from_config(config: &ClientConfig) -> WizardResult<Self> {
        if config.demo_mode {
            tracing::warn!("Demo mode enabled: responses are canned, nothing is sent to the training service");
            let demo = Arc::new(DemoTrainingService::new());
            return Ok(Self {
                training: demo.clone(),
                prediction: demo,
                demo: true,
            });
        }

        Ok(Self {
            training: Arc::new(HttpTrainingClient::new(config.clone())?),
            prediction: Arc::new(HttpPredictionClient::new(config.clone())?),
            demo: false,
        })
    }
}
