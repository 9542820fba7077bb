//! Training status polling
//!
//! Checks the job at a fixed interval until it reaches a terminal status.

use crate::error::{WizardError, WizardResult};
use crate::services::TrainingService;
use chrono::Utc;
use ncml_common::api::{TrainingStatus, TrainingStatusResponse};
use ncml_common::events::{EventBus, WizardEvent};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Consecutive failed status checks tolerated before giving up
const MAX_CONSECUTIVE_ERRORS: u32 = 3;

pub struct StatusPoller<'a> {
    service: &'a dyn TrainingService,
    interval: Duration,
    max_wait: Option<Duration>,
    events: Option<EventBus>,
}

impl<'a> StatusPoller<'a> {
    pub fn new(service: &'a dyn TrainingService, interval: Duration) -> Self {
        Self {
            service,
            interval,
            max_wait: None,
            events: None,
        }
    }

    /// Stop with [`WizardError::Timeout`] once this much time has passed
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Poll until the job is `ready`
    ///
    /// A `failed` job yields [`WizardError::TrainingFailed`]. Transient
    /// errors are logged and polling continues.
    pub async fn wait_until_ready(&self, training_id: &str) -> WizardResult<TrainingStatusResponse> {
        let started = Instant::now();
        let mut last_status: Option<TrainingStatus> = None;
        let mut consecutive_errors = 0u32;

        loop {
            match self.service.training_status(training_id).await {
                Ok(response) => {
                    consecutive_errors = 0;
                    if last_status != Some(response.status) {
                        last_status = Some(response.status);
                        self.publish(training_id, response.status);
                    }

                    match response.status {
                        TrainingStatus::Ready => {
                            info!(training_id = %training_id, "Model ready");
                            return Ok(response);
                        }
                        TrainingStatus::Failed => {
                            warn!(training_id = %training_id, message = ?response.message, "Model training failed");
                            return Err(WizardError::TrainingFailed);
                        }
                        TrainingStatus::Training | TrainingStatus::Unknown => {}
                    }
                }
                Err(e) if e.is_remote() => {
                    consecutive_errors += 1;
                    warn!(
                        training_id = %training_id,
                        attempt = consecutive_errors,
                        error = %e,
                        "Error checking training status"
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }

            if let Some(max_wait) = self.max_wait {
                if started.elapsed() + self.interval > max_wait {
                    return Err(WizardError::Timeout(max_wait));
                }
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    fn publish(&self, training_id: &str, status: TrainingStatus) {
        if let Some(events) = &self.events {
            events.emit_lossy(WizardEvent::TrainingStatusChanged {
                training_id: training_id.to_string(),
                status,
                timestamp: Utc::now(),
            });
        }
    }
}
