//! Event types for the wizard event system

use crate::TaskType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::api::TrainingStatus;

/// Wizard step, without the data each step carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Project name, description and type
    Details,
    /// Dataset selection and preview
    Upload,
    /// Target/feature columns and training options
    Configure,
    /// Training request in flight
    Submitting,
    /// Training request accepted
    Success,
    /// Training request rejected or not delivered
    Failed,
}

impl WizardStep {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Details => "Project Details",
            Self::Upload => "Upload Dataset",
            Self::Configure => "Configure Model",
            Self::Submitting => "Submitting",
            Self::Success => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// 1-based position in the progress indicator
    pub fn step_number(&self) -> usize {
        match self {
            Self::Details => 1,
            Self::Upload => 2,
            Self::Configure | Self::Submitting | Self::Success | Self::Failed => 3,
        }
    }

    pub fn total_steps() -> usize {
        3
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Wizard event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WizardEvent {
    /// Wizard moved between steps
    StepChanged {
        session_id: Uuid,
        from: WizardStep,
        to: WizardStep,
        timestamp: DateTime<Utc>,
    },

    /// Dataset parsed and accepted
    DatasetLoaded {
        session_id: Uuid,
        filename: String,
        column_count: usize,
        /// False when the column inventory is a placeholder
        full_preview: bool,
        timestamp: DateTime<Utc>,
    },

    /// Dataset selection rejected (unsupported type or parse failure)
    DatasetRejected {
        session_id: Uuid,
        filename: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Training request sent
    SubmissionStarted {
        session_id: Uuid,
        project_name: String,
        task_type: TaskType,
        feature_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Training request accepted by the service
    SubmissionSucceeded {
        session_id: Uuid,
        training_id: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// Training request failed
    SubmissionFailed {
        session_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Training job status observed while polling
    TrainingStatusChanged {
        training_id: String,
        status: TrainingStatus,
        timestamp: DateTime<Utc>,
    },
}

impl WizardEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::StepChanged { timestamp, .. }
            | Self::DatasetLoaded { timestamp, .. }
            | Self::DatasetRejected { timestamp, .. }
            | Self::SubmissionStarted { timestamp, .. }
            | Self::SubmissionSucceeded { timestamp, .. }
            | Self::SubmissionFailed { timestamp, .. }
            | Self::TrainingStatusChanged { timestamp, .. } => *timestamp,
        }
    }
}

/// Broadcast channel for wizard events
///
/// Cloning shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WizardEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: WizardEvent,
    ) -> Result<usize, broadcast::error::SendError<WizardEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WizardEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
