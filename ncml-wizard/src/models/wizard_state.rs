//! Wizard state machine
//!
//! Details → Upload → Configure → Submitting → Success | Failed
//!
//! Each state carries only the data that exists in it; project, dataset and
//! selection live on the wizard itself and survive every transition.

use chrono::{DateTime, Utc};
use ncml_common::events::WizardStep;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardState {
    Details,
    Upload,
    Configure,
    /// Training request in flight
    Submitting,
    /// Service accepted the request
    Success { training_id: Option<String> },
    /// Request rejected or not delivered; all data retained for retry
    Failed { message: String },
}

impl WizardState {
    pub fn step(&self) -> WizardStep {
        match self {
            Self::Details => WizardStep::Details,
            Self::Upload => WizardStep::Upload,
            Self::Configure => WizardStep::Configure,
            Self::Submitting => WizardStep::Submitting,
            Self::Success { .. } => WizardStep::Success,
            Self::Failed { .. } => WizardStep::Failed,
        }
    }

    /// True where the training request may be (re)sent
    pub fn can_submit(&self) -> bool {
        matches!(self, Self::Configure | Self::Failed { .. })
    }

    /// Failure message, when in `Failed`
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Record of one state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub from: WizardStep,
    pub to: WizardStep,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_steps() {
        assert_eq!(WizardState::Details.step(), WizardStep::Details);
        let failed = WizardState::Failed {
            message: "bad column".to_string(),
        };
        assert_eq!(failed.step(), WizardStep::Failed);
        assert_eq!(failed.failure(), Some("bad column"));
        assert!(failed.can_submit());
        assert!(!WizardState::Submitting.can_submit());
    }

    #[test]
    fn test_state_serializes_tagged() {
        let state = WizardState::Success {
            training_id: Some("t-1".to_string()),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "success");
        assert_eq!(json["training_id"], "t-1");
    }
}
