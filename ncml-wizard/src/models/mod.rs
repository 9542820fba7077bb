//! Data models for the project creation wizard
//!
//! - Project metadata, dataset, column selection and training settings
//! - Wizard state machine and the derived submission payload

pub mod dataset;
pub mod payload;
pub mod project;
pub mod selection;
pub mod settings;
pub mod wizard_state;

pub use dataset::{DataPreview, DatasetFile, FileSource, MediaType, PreviewFidelity};
pub use payload::SubmissionPayload;
pub use project::ProjectDraft;
pub use selection::{ColumnSelection, FeatureToggle};
pub use settings::ModelSettings;
pub use wizard_state::{StateTransition, WizardState};
