//! Error types for ncml-wizard
//!
//! Every variant is recoverable by user action; none terminates the process.

use ncml_common::events::WizardStep;
use std::time::Duration;
use thiserror::Error;

/// Wizard error type
#[derive(Debug, Error)]
pub enum WizardError {
    /// Required field missing or invalid; blocks the step transition
    #[error("{0}")]
    Validation(String),

    /// Uploaded file unreadable or malformed; previous dataset retained
    #[error("Error parsing CSV file: {0}")]
    Parse(String),

    /// File type outside the accepted set
    #[error("Unsupported file type '{0}'. Please upload a CSV, Excel, or JSON file")]
    UnsupportedMediaType(String),

    /// Request never reached the service or the connection failed
    #[error("Network error: {0}")]
    Network(String),

    /// Caller-side timeout elapsed
    #[error("Request timed out after {} s", format_secs(.0))]
    Timeout(Duration),

    /// Service answered with a non-2xx status
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Training job reported `failed`
    #[error("Model training failed. Please try again with a different dataset or configuration.")]
    TrainingFailed,

    /// Second submission while one is pending
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Cannot {action} from step '{from}'")]
    InvalidTransition {
        from: WizardStep,
        action: &'static str,
    },

    #[error("Sign in to create a project")]
    NotAuthenticated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] ncml_common::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WizardError {
    /// True for errors raised by the remote service or the transport
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::Server { .. } | Self::TrainingFailed
        )
    }

    /// HTTP status of a server error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn format_secs(duration: &Duration) -> String {
    if duration.subsec_millis() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{:.1}", duration.as_secs_f64())
    }
}

/// Result type for wizard operations
pub type WizardResult<T> = Result<T, WizardError>;
