//! Training-service API types
//!
//! Request/response bodies exchanged with the external training and
//! prediction service. No HTTP client code lives here; the wizard crate
//! owns the transport.

pub mod types;

pub use types::{
    ErrorBody, ModelInfo, PredictionRequest, PredictionResult, TrainingResponse, TrainingStatus,
    TrainingStatusResponse,
};
